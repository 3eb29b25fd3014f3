//! Authentication server trait.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::types::{ApiRequest, ApiResponse, Identity, ServerUrl};
use crate::{AccessToken, Credentials};

/// The authentication server, as seen by the session core.
///
/// Each method is a single exchange with no retry. The refresh credential
/// is owned by the implementation (for HTTP, its cookie jar) and never
/// crosses this boundary.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Returns the server URL for this instance.
    fn server(&self) -> &ServerUrl;

    /// Exchange email and password for an access token (`POST /auth/login`).
    async fn login(&self, credentials: &Credentials) -> Result<AccessToken, ApiError>;

    /// Create a new account (`POST /auth/register`).
    async fn register(&self, credentials: &Credentials) -> Result<(), ApiError>;

    /// Fetch the identity the token belongs to (`GET /auth/me`).
    async fn fetch_identity(&self, token: &AccessToken) -> Result<Identity, ApiError>;

    /// Exchange the refresh credential for a new access token
    /// (`POST /auth/refresh`).
    async fn refresh(&self) -> Result<AccessToken, ApiError>;

    /// Send an arbitrary request, attaching the token as bearer credential
    /// when one is given.
    ///
    /// Non-success statuses are returned as responses; only transport
    /// failures are errors.
    async fn send(
        &self,
        request: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Result<ApiResponse, ApiError>;
}
