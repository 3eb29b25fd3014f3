//! Authenticated identity record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The identity of the authenticated user, as returned by `GET /auth/me`.
///
/// Identities are immutable; a new login or recovery replaces the whole
/// value. Extra fields in the server record (such as the numeric id) are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    email: String,
}

impl Identity {
    /// Create a new identity.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }

    /// Returns the email address of the authenticated user.
    pub fn email(&self) -> &str {
        &self.email
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}
