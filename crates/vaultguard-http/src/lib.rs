//! vaultguard-http - HTTP transport for the VaultGuard session client.
//!
//! Implements [`vaultguard_core::traits::AuthApi`] over `reqwest`, with a
//! cookie jar carrying the refresh credential.

mod api;
mod client;
mod config;
mod endpoints;

pub use api::HttpAuthApi;
pub use config::{DEFAULT_USER_AGENT, HttpConfig};
