//! Published session state.

use std::fmt;

use crate::types::Identity;

/// The state of the session as seen by observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No authenticated identity.
    Anonymous,
    /// Startup recovery is in progress.
    Recovering,
    /// A token is stored and the identity it belongs to is known.
    Authenticated(Identity),
    /// An authenticated session was dropped because its token could not be
    /// refreshed. Carries no identity and otherwise behaves like
    /// [`SessionState::Anonymous`].
    Expired { reason: String },
}

impl SessionState {
    /// Returns the identity if authenticated.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    /// Returns true once startup recovery has finished.
    pub fn is_settled(&self) -> bool {
        !matches!(self, SessionState::Recovering)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Anonymous => f.write_str("anonymous"),
            SessionState::Recovering => f.write_str("recovering"),
            SessionState::Authenticated(identity) => write!(f, "authenticated as {}", identity),
            SessionState::Expired { reason } => write!(f, "expired ({})", reason),
        }
    }
}
