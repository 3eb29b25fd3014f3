//! Core value types.
//!
//! These types enforce their invariants at construction time.

mod api;
mod identity;
mod server_url;

pub use api::{ApiRequest, ApiResponse, Method, error_detail};
pub use identity::Identity;
pub use server_url::ServerUrl;
