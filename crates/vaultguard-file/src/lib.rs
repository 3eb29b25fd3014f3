//! vaultguard-file - Filesystem-backed token storage.

mod store;

pub use store::{ACCESS_TOKEN_KEY, FileStoreError, FileTokenStore, REFRESH_COOKIE_KEY};
