//! Authentication endpoint paths and request/response bodies.

use serde::{Deserialize, Serialize};

/// POST, exchanges email and password for an access token.
pub const LOGIN: &str = "/auth/login";

/// POST, creates an account.
pub const REGISTER: &str = "/auth/register";

/// GET, returns the identity of the bearer.
pub const ME: &str = "/auth/me";

/// POST, exchanges the refresh cookie for an access token.
pub const REFRESH: &str = "/auth/refresh";

/// Request body for login and register.
#[derive(Debug, Serialize)]
pub struct CredentialsRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from login and refresh.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    #[allow(dead_code)]
    pub token_type: Option<String>,
}
