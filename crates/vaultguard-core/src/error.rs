//! Error types for the VaultGuard session client.
//!
//! Transport and protocol failures are combined into [`ApiError`], which is
//! `Clone` so that a single refresh outcome can be handed to every waiter.
//! Session-level failures have their own types: [`LoginError`] is surfaced to
//! callers, [`RefreshError`] is recovered locally, and [`UnauthorizedError`]
//! marks a request that was still rejected after the refresh-retry.

use std::fmt;
use thiserror::Error;

/// The unified error type for VaultGuard operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A call to the authentication server failed.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Login or registration failed.
    #[error("login failed: {0}")]
    Login(#[from] LoginError),

    /// The refresh credential could not be exchanged for an access token.
    #[error(transparent)]
    Refresh(#[from] RefreshError),

    /// A request was rejected even after a refresh-retry.
    #[error(transparent)]
    Unauthorized(#[from] UnauthorizedError),

    /// Input validation errors (server URL, malformed values).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Transport-level errors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// A non-success response from the authentication server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// The `detail` field of the error body, if the server sent one.
    pub detail: Option<String>,
}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, detail: Option<String>) -> Self {
        Self { status, detail }
    }

    /// Check if the server rejected the request as unauthorized.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref detail) = self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

/// Failure of a single exchange with the authentication server.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with a non-success status.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The server answered with a body that could not be decoded.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },
}

impl ApiError {
    /// Returns true if the server rejected the request with 401.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Protocol(e) if e.is_unauthorized())
    }

    /// Returns the HTTP status, if the server responded at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Protocol(e) => Some(e.status),
            _ => None,
        }
    }
}

/// Errors surfaced by `login` and `register`.
#[derive(Debug, Clone, Error)]
pub enum LoginError {
    /// A required field was empty.
    #[error("{field} must not be empty")]
    MissingField { field: &'static str },

    /// The registration exchange failed (e.g. the email is already taken).
    #[error("registration failed: {0}")]
    Registration(ApiError),

    /// The login exchange failed (bad credentials, network failure).
    #[error("{0}")]
    Rejected(ApiError),

    /// The login succeeded but the identity could not be fetched.
    #[error("failed to fetch identity after login: {0}")]
    Identity(ApiError),

    /// The token was cleared before the session could be published.
    #[error("session was cleared before login completed")]
    Interrupted,
}

/// The refresh credential could not be exchanged for an access token.
#[derive(Debug, Clone, Error)]
#[error("refresh failed: {source}")]
pub struct RefreshError {
    #[source]
    pub source: ApiError,
}

impl From<ApiError> for RefreshError {
    fn from(source: ApiError) -> Self {
        Self { source }
    }
}

/// A request was rejected as unauthorized after the refresh-retry.
#[derive(Debug, Clone, Error)]
#[error("unauthorized: {method} {path}")]
pub struct UnauthorizedError {
    pub method: String,
    pub path: String,
}

/// Input validation errors.
#[derive(Debug, Clone, Error)]
pub enum InvalidInputError {
    /// Invalid server URL.
    #[error("invalid server URL '{value}': {reason}")]
    ServerUrl { value: String, reason: String },

    /// Invalid request path.
    #[error("invalid request path '{value}': {reason}")]
    Path { value: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
