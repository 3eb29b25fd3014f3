//! Single-flight access token refresh.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::AccessToken;
use crate::error::RefreshError;
use crate::traits::{AuthApi, TokenStore};

type RefreshOutcome = Result<AccessToken, RefreshError>;
type PendingRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// Exchanges the refresh credential for a new access token.
///
/// At most one exchange is in flight at a time. Callers arriving while an
/// exchange is pending attach to it and receive the same outcome; once it
/// resolves the pending slot is emptied, so the next call starts a fresh
/// exchange.
///
/// Cheap to clone; clones share the pending slot.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn TokenStore>,
    pending: Mutex<Option<(u64, PendingRefresh)>>,
    next_id: AtomicU64,
}

impl RefreshCoordinator {
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                api,
                store,
                pending: Mutex::new(None),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Refresh the access token.
    ///
    /// On success the new token has been written to the token store. On
    /// failure the token store has been cleared.
    ///
    /// Both writes only apply to the token that was stored when the
    /// exchange started. If a login or logout replaced it in the meantime,
    /// the newer state is kept and a successful refresh yields the stored
    /// token instead.
    pub async fn refresh(&self) -> Result<AccessToken, RefreshError> {
        self.pending_or_start().await
    }

    /// Returns true while an exchange is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.inner.pending.lock().is_some()
    }

    fn pending_or_start(&self) -> PendingRefresh {
        let mut pending = self.inner.pending.lock();
        if let Some((id, refresh)) = pending.as_ref() {
            debug!(id, "Joining in-flight refresh");
            return refresh.clone();
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);
        let refresh = async move {
            let outcome = inner.exchange(id).await;
            inner.finish(id);
            outcome
        }
        .boxed()
        .shared();

        *pending = Some((id, refresh.clone()));
        refresh
    }
}

impl CoordinatorInner {
    #[instrument(skip(self), fields(server = %self.api.server()))]
    async fn exchange(&self, id: u64) -> RefreshOutcome {
        info!("Refreshing access token");
        let replacing = self.store.read();

        match self.api.refresh().await {
            Ok(token) => {
                if self.store.replace_if(replacing.as_ref(), Some(&token)) {
                    debug!("Access token refreshed");
                    return Ok(token);
                }
                // A login or logout landed while the exchange was in flight.
                debug!("Token store changed during refresh, keeping newer state");
                Ok(self.store.read().unwrap_or(token))
            }
            Err(e) => {
                if self.store.replace_if(replacing.as_ref(), None) {
                    warn!(error = %e, "Refresh failed, cleared stored token");
                } else {
                    warn!(error = %e, "Refresh failed, stored token was replaced meanwhile");
                }
                Err(RefreshError::from(e))
            }
        }
    }

    fn finish(&self, id: u64) {
        let mut pending = self.pending.lock();
        if pending.as_ref().is_some_and(|(current, _)| *current == id) {
            pending.take();
        }
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("server", self.inner.api.server())
            .field("refreshing", &self.is_refreshing())
            .finish()
    }
}
