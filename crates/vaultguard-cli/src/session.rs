//! Session wiring and persistence for the CLI.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::debug;

use vaultguard_core::traits::AuthApi;
use vaultguard_core::{ServerUrl, SessionController};
use vaultguard_file::{FileTokenStore, REFRESH_COOKIE_KEY};
use vaultguard_http::{HttpAuthApi, HttpConfig};

use crate::cli::GlobalArgs;

/// Resolve the directory holding the session file.
fn data_dir(args: &GlobalArgs) -> Result<PathBuf> {
    if let Some(dir) = &args.data_dir {
        return Ok(dir.clone());
    }
    let dirs =
        ProjectDirs::from("", "", "vaultguard").context("Could not determine data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}

/// A session controller over the HTTP transport and the on-disk store.
///
/// The access token is persisted by the store as it changes. The refresh
/// cookie lives in the transport's cookie jar and is only written back by
/// [`CliSession::persist_cookies`].
pub struct CliSession {
    api: Arc<HttpAuthApi>,
    store: Arc<FileTokenStore>,
    controller: SessionController,
}

impl CliSession {
    pub fn open(args: &GlobalArgs) -> Result<Self> {
        let server = ServerUrl::new(&args.server).context("Invalid server URL")?;

        let mut config = HttpConfig::new(server);
        if let Some(secs) = args.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        let api = Arc::new(HttpAuthApi::new(config).context("Failed to build HTTP client")?);

        let store = Arc::new(FileTokenStore::in_dir(data_dir(args)?));
        debug!(path = %store.path().display(), "Using session file");

        if let Some(cookies) = store
            .get(REFRESH_COOKIE_KEY)
            .context("Failed to read session file")?
        {
            api.import_cookies(&cookies);
        }

        let controller = SessionController::new(api.clone(), store.clone());
        Ok(Self {
            api,
            store,
            controller,
        })
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn server(&self) -> &ServerUrl {
        self.api.server()
    }

    /// Write the transport's cookies back to the session file.
    pub fn persist_cookies(&self) -> Result<()> {
        let result = match self.api.export_cookies() {
            Some(cookies) => self.store.set(REFRESH_COOKIE_KEY, &cookies),
            None => self.store.remove(REFRESH_COOKIE_KEY),
        };
        result.context("Failed to save session cookies")
    }

    /// Drop the persisted cookies.
    pub fn forget_cookies(&self) -> Result<()> {
        self.store
            .remove(REFRESH_COOKIE_KEY)
            .context("Failed to remove session cookies")
    }
}
