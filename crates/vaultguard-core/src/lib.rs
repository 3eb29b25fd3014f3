//! vaultguard-core - Session lifecycle for the VaultGuard authentication client.
//!
//! This crate holds the token lifecycle state machine: when a stored access
//! token is trusted, when a silent refresh is attempted, how concurrent
//! refreshes are collapsed into one exchange, and how failures cascade into
//! logout. It talks to the server only through the [`traits::AuthApi`] trait
//! and persists tokens only through [`traits::TokenStore`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vaultguard_core::{ApiRequest, MemoryTokenStore, SessionController};
//! # use vaultguard_core::traits::AuthApi;
//!
//! # async fn example(api: Arc<dyn AuthApi>) -> Result<(), vaultguard_core::Error> {
//! let session = SessionController::new(api, Arc::new(MemoryTokenStore::new()));
//!
//! if let Some(identity) = session.recover().await.identity() {
//!     println!("Welcome back, {}", identity.email());
//! }
//!
//! let request = ApiRequest::get("/vault/items")?;
//! let response = session.request(&request).await?.error_for_status(&request)?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod error;
pub mod policy;
pub mod refresh;
pub mod request;
pub mod session;
pub mod store;
pub mod tokens;
pub mod traits;
pub mod types;

#[cfg(test)]
mod testutil;

pub use credentials::Credentials;
pub use error::{
    ApiError, Error, InvalidInputError, LoginError, ProtocolError, RefreshError, TransportError,
    UnauthorizedError,
};
pub use refresh::RefreshCoordinator;
pub use request::AuthorizedClient;
pub use session::{SessionController, SessionState};
pub use store::MemoryTokenStore;
pub use tokens::AccessToken;
pub use traits::{AuthApi, TokenStore};
pub use types::{ApiRequest, ApiResponse, Identity, Method, ServerUrl};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
