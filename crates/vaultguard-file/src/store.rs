//! JSON key-value file holding the persisted session.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use vaultguard_core::AccessToken;
use vaultguard_core::traits::TokenStore;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Key under which the access token is stored.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Key under which a front end may keep the transport's cookies.
pub const REFRESH_COOKIE_KEY: &str = "refreshCookie";

/// Errors from the file-backed store.
#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt session file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredValues {
    #[serde(default)]
    values: BTreeMap<String, String>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

/// A [`TokenStore`] backed by a JSON file.
///
/// Values live under string keys in a single file, written with `0600`
/// permissions on Unix. Every access takes an advisory lock on a sibling
/// `.lock` file so that concurrent processes never interleave a
/// read-modify-write.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Use the file at `path`. Nothing is created until the first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Use `session.json` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn io_error(&self, source: std::io::Error) -> FileStoreError {
        FileStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn open_lock(&self) -> Result<File, FileStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(|e| self.io_error(e))
    }

    fn load(&self) -> Result<StoredValues, FileStoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoredValues::default());
            }
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_str(&json).map_err(|source| FileStoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn persist(&self, stored: &StoredValues) -> Result<(), FileStoreError> {
        let json = serde_json::to_string_pretty(stored).map_err(|source| {
            FileStoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let mut file = File::create(&tmp_path).map_err(|e| self.io_error(e))?;

        #[cfg(unix)]
        {
            let mut perms = file.metadata().map_err(|e| self.io_error(e))?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&tmp_path, perms).map_err(|e| self.io_error(e))?;
        }

        file.write_all(json.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| self.io_error(e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| self.io_error(e))
    }

    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn get(&self, key: &str) -> Result<Option<String>, FileStoreError> {
        let lock = self.open_lock()?;
        lock.lock_shared().map_err(|e| self.io_error(e))?;
        let stored = self.load()?;
        Ok(stored.values.get(key).cloned())
    }

    /// Store `value` under `key`, replacing any prior value.
    ///
    /// A corrupt file is replaced rather than reported.
    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    pub fn set(&self, key: &str, value: &str) -> Result<(), FileStoreError> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    /// Remove `key`. Removing a missing key is not an error.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn remove(&self, key: &str) -> Result<(), FileStoreError> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|values| {
            values.remove(key);
        })
    }

    fn update(
        &self,
        apply: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), FileStoreError> {
        self.update_if(|values| {
            apply(values);
            true
        })
        .map(|_| ())
    }

    /// Read-modify-write under the exclusive lock. The file is only
    /// rewritten when `apply` returns true.
    fn update_if(
        &self,
        apply: impl FnOnce(&mut BTreeMap<String, String>) -> bool,
    ) -> Result<bool, FileStoreError> {
        let lock = self.open_lock()?;
        lock.lock_exclusive().map_err(|e| self.io_error(e))?;

        let mut stored = match self.load() {
            Ok(stored) => stored,
            Err(e @ FileStoreError::Corrupt { .. }) => {
                warn!(error = %e, "Replacing corrupt session file");
                StoredValues::default()
            }
            Err(e) => return Err(e),
        };
        if !apply(&mut stored.values) {
            return Ok(false);
        }
        stored.updated_at = Some(Utc::now());

        self.persist(&stored)?;
        debug!("Session file written");
        Ok(true)
    }

    /// When the file was last written, if it exists.
    pub fn updated_at(&self) -> Result<Option<DateTime<Utc>>, FileStoreError> {
        let lock = self.open_lock()?;
        lock.lock_shared().map_err(|e| self.io_error(e))?;
        Ok(self.load()?.updated_at)
    }
}

impl TokenStore for FileTokenStore {
    fn save(&self, token: &AccessToken) {
        if let Err(e) = self.set(ACCESS_TOKEN_KEY, token.as_str()) {
            warn!(error = %e, "Failed to persist access token");
            // A token that may be half-written is treated as absent.
            if let Err(e) = self.remove(ACCESS_TOKEN_KEY) {
                warn!(error = %e, "Failed to discard access token");
            }
        }
    }

    fn read(&self) -> Option<AccessToken> {
        match self.get(ACCESS_TOKEN_KEY) {
            Ok(value) => value.filter(|v| !v.is_empty()).map(AccessToken::new),
            Err(e) => {
                warn!(error = %e, "Failed to read access token");
                None
            }
        }
    }

    fn clear(&self) {
        if let Err(e) = self.remove(ACCESS_TOKEN_KEY) {
            warn!(error = %e, "Failed to clear access token");
        }
    }

    fn replace_if(&self, current: Option<&AccessToken>, next: Option<&AccessToken>) -> bool {
        let result = self.update_if(|values| {
            let stored = values.get(ACCESS_TOKEN_KEY).filter(|v| !v.is_empty());
            if stored.map(String::as_str) != current.map(AccessToken::as_str) {
                return false;
            }
            match next {
                Some(token) => {
                    values.insert(ACCESS_TOKEN_KEY.to_string(), token.as_str().to_string())
                }
                None => values.remove(ACCESS_TOKEN_KEY),
            };
            true
        });

        match result {
            Ok(replaced) => replaced,
            Err(e) => {
                warn!(error = %e, "Failed to replace access token");
                false
            }
        }
    }
}
