//! In-process token storage.

use parking_lot::RwLock;

use crate::AccessToken;
use crate::traits::TokenStore;

/// A [`TokenStore`] that lives only as long as the process.
///
/// Useful for tests and for embedders that do not want the token to
/// survive a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<AccessToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding a token.
    pub fn with_token(token: AccessToken) -> Self {
        Self {
            token: RwLock::new(Some(token)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, token: &AccessToken) {
        *self.token.write() = Some(token.clone());
    }

    fn read(&self) -> Option<AccessToken> {
        self.token.read().clone()
    }

    fn clear(&self) {
        self.token.write().take();
    }

    fn replace_if(&self, current: Option<&AccessToken>, next: Option<&AccessToken>) -> bool {
        let mut token = self.token.write();
        if token.as_ref() != current {
            return false;
        }
        *token = next.cloned();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_replaces_prior_value() {
        let store = MemoryTokenStore::new();
        assert!(store.read().is_none());

        store.save(&AccessToken::new("first"));
        store.save(&AccessToken::new("second"));
        assert_eq!(store.read(), Some(AccessToken::new("second")));
    }

    #[test]
    fn clear_removes_token() {
        let store = MemoryTokenStore::with_token(AccessToken::new("T"));
        store.clear();
        assert!(store.read().is_none());

        // Clearing an empty store is a no-op.
        store.clear();
        assert!(store.read().is_none());
    }

    #[test]
    fn replace_if_only_writes_over_the_expected_token() {
        let store = MemoryTokenStore::with_token(AccessToken::new("login"));

        let stale = AccessToken::new("stale");
        assert!(!store.replace_if(Some(&stale), None));
        assert_eq!(store.read(), Some(AccessToken::new("login")));

        let login = AccessToken::new("login");
        assert!(store.replace_if(Some(&login), Some(&AccessToken::new("next"))));
        assert_eq!(store.read(), Some(AccessToken::new("next")));

        assert!(!store.replace_if(None, Some(&AccessToken::new("other"))));
        assert!(store.replace_if(Some(&AccessToken::new("next")), None));
        assert!(store.read().is_none());
    }
}
