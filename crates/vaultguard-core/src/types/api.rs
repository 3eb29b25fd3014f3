//! Transport-neutral request and response values.

use serde::de::DeserializeOwned;
use std::fmt;

use crate::error::{ApiError, Error, InvalidInputError, ProtocolError, UnauthorizedError};

/// HTTP method of an [`ApiRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            _ => Err(InvalidInputError::Other {
                message: format!("unsupported HTTP method '{}'", s),
            }
            .into()),
        }
    }
}

/// A request against a resource on the authentication server.
///
/// The path is relative to the server URL and must start with `/`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Create a request without a body.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute or contains a scheme.
    pub fn new(method: Method, path: impl Into<String>) -> Result<Self, Error> {
        let path = path.into();
        if !path.starts_with('/') || path.starts_with("//") {
            return Err(InvalidInputError::Path {
                value: path,
                reason: "must start with a single '/'".to_string(),
            }
            .into());
        }
        if path.chars().any(char::is_whitespace) {
            return Err(InvalidInputError::Path {
                value: path,
                reason: "must not contain whitespace".to_string(),
            }
            .into());
        }
        Ok(Self {
            method,
            path,
            body: None,
        })
    }

    /// Shorthand for a `GET` request.
    pub fn get(path: impl Into<String>) -> Result<Self, Error> {
        Self::new(Method::Get, path)
    }

    /// Attach a JSON body.
    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }
}

/// A response from the authentication server.
///
/// Non-success statuses are values here, not errors; use
/// [`ApiResponse::error_for_status`] to turn them into one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    status: u16,
    body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns true for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true if the server signalled "unauthorized".
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|e| ApiError::InvalidResponse {
            message: e.to_string(),
        })
    }

    /// Turn a non-success response into an error.
    ///
    /// A 401 becomes [`UnauthorizedError`]; other failures become a
    /// [`ProtocolError`] carrying the server's `detail`, if any.
    pub fn error_for_status(self, request: &ApiRequest) -> Result<Self, Error> {
        if self.is_success() {
            return Ok(self);
        }
        if self.is_unauthorized() {
            return Err(UnauthorizedError {
                method: request.method().to_string(),
                path: request.path().to_string(),
            }
            .into());
        }
        Err(ApiError::from(ProtocolError::new(self.status, error_detail(&self.body))).into())
    }
}

/// Extract the `detail` message from an error body.
///
/// Structured details (such as validation error lists) are rendered as
/// compact JSON.
pub fn error_detail(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}
