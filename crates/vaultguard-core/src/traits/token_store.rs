//! Access token persistence trait.

use crate::AccessToken;

/// Persistent home of the single live access token.
///
/// All operations are infallible from the caller's point of view: an
/// implementation whose backing medium fails logs the failure and behaves
/// as if no token were stored.
pub trait TokenStore: Send + Sync {
    /// Persist the token, replacing any prior value.
    fn save(&self, token: &AccessToken);

    /// Returns the stored token, if any.
    fn read(&self) -> Option<AccessToken>;

    /// Remove the stored token.
    fn clear(&self);

    /// Write `next` (or clear when `None`) only if the store still holds
    /// `current`. Returns `false` and leaves the store untouched otherwise.
    ///
    /// The default implementation is not atomic; stores that can be
    /// written concurrently should override it.
    fn replace_if(&self, current: Option<&AccessToken>, next: Option<&AccessToken>) -> bool {
        if self.read().as_ref() != current {
            return false;
        }
        match next {
            Some(token) => self.save(token),
            None => self.clear(),
        }
        true
    }
}
