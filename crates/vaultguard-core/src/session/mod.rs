//! Session lifecycle: startup recovery, login, logout and forced expiry.

mod controller;
mod state;

pub use controller::SessionController;
pub use state::SessionState;
