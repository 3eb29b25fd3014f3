//! The session controller.

use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell, watch};
use tracing::{debug, info, instrument, warn};

use crate::error::{ApiError, Error, LoginError};
use crate::refresh::RefreshCoordinator;
use crate::request::{AuthorizedClient, RetryOutcome};
use crate::traits::{AuthApi, TokenStore};
use crate::types::{ApiRequest, ApiResponse, Identity};
use crate::Credentials;

use super::SessionState;

/// Owns the session of one client and publishes it to observers.
///
/// Startup recovery runs once, either through [`SessionController::recover`]
/// or implicitly before the first login, logout, register, refresh or
/// request. Those operations queue behind recovery and behind each other,
/// so transitions never interleave. The controller only publishes
/// [`SessionState::Authenticated`] while the token store holds a token.
///
/// Cheap to clone; clones share the same session.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use vaultguard_core::{Credentials, MemoryTokenStore, SessionController};
/// # use vaultguard_core::traits::AuthApi;
///
/// # async fn example(api: Arc<dyn AuthApi>) -> Result<(), vaultguard_core::LoginError> {
/// let session = SessionController::new(api, Arc::new(MemoryTokenStore::new()));
/// session.recover().await;
///
/// let identity = session
///     .login(&Credentials::new("a@b.com", "GoodPass123!"))
///     .await?;
/// println!("Logged in as {}", identity.email());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn TokenStore>,
    client: AuthorizedClient,
    state: watch::Sender<SessionState>,
    recovered: OnceCell<()>,
    transition: Mutex<()>,
}

impl SessionController {
    /// Create a controller in the [`SessionState::Recovering`] state.
    ///
    /// The state stays `Recovering` until startup recovery settles it, so
    /// observers never see a logged-out session that is about to be
    /// restored.
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn TokenStore>) -> Self {
        let refresher = RefreshCoordinator::new(Arc::clone(&api), Arc::clone(&store));
        let client = AuthorizedClient::new(Arc::clone(&api), Arc::clone(&store), refresher);
        let (state, _) = watch::channel(SessionState::Recovering);

        Self {
            inner: Arc::new(ControllerInner {
                api,
                store,
                client,
                state,
                recovered: OnceCell::new(),
                transition: Mutex::new(()),
            }),
        }
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.enforce_invariant();
        self.inner.state.borrow().clone()
    }

    /// Returns the identity if authenticated.
    pub fn identity(&self) -> Option<Identity> {
        self.state().identity().cloned()
    }

    fn refresher(&self) -> &RefreshCoordinator {
        self.inner.client.refresher()
    }

    /// Run startup recovery if it has not run yet and return the settled
    /// state.
    ///
    /// Failures are logged and resolve to [`SessionState::Anonymous`].
    pub async fn recover(&self) -> SessionState {
        self.inner
            .recovered
            .get_or_init(|| self.run_recovery())
            .await;
        self.state()
    }

    #[instrument(skip(self), fields(server = %self.inner.api.server()))]
    async fn run_recovery(&self) {
        let _guard = self.inner.transition.lock().await;
        self.publish(SessionState::Recovering);

        if let Some(token) = self.inner.store.read() {
            match self.inner.api.fetch_identity(&token).await {
                Ok(identity) => {
                    info!(identity = %identity, "Session recovered from stored token");
                    self.settle(identity);
                    return;
                }
                Err(e) => debug!(error = %e, "Stored token rejected"),
            }
        } else {
            debug!("No stored token");
        }

        let token = match self.refresher().refresh().await {
            Ok(token) => token,
            Err(e) => {
                debug!(error = %e, "No session to recover");
                self.inner.store.clear();
                self.publish(SessionState::Anonymous);
                return;
            }
        };

        match self.inner.api.fetch_identity(&token).await {
            Ok(identity) => {
                info!(identity = %identity, "Session recovered through refresh");
                self.settle(identity);
            }
            Err(e) => {
                warn!(error = %e, "Identity fetch failed after refresh");
                self.inner.store.clear();
                self.publish(SessionState::Anonymous);
            }
        }
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::MissingField`] for an empty email or password,
    /// [`LoginError::Rejected`] if the server refuses the credentials (the
    /// session is left as it was), and [`LoginError::Identity`] if the
    /// identity could not be fetched afterwards (the new token is discarded).
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<Identity, LoginError> {
        check_not_empty(credentials)?;
        self.recover().await;
        let _guard = self.inner.transition.lock().await;

        info!("Logging in");
        self.login_locked(credentials).await
    }

    /// Create an account, then log in with it.
    ///
    /// Email shape and password strength are not checked here; see
    /// [`crate::policy`].
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::Registration`] if the server refuses the new
    /// account, otherwise the errors of [`SessionController::login`].
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn register(&self, credentials: &Credentials) -> Result<Identity, LoginError> {
        check_not_empty(credentials)?;
        self.recover().await;
        let _guard = self.inner.transition.lock().await;

        info!("Registering account");
        self.inner
            .api
            .register(credentials)
            .await
            .map_err(LoginError::Registration)?;

        self.login_locked(credentials).await
    }

    async fn login_locked(&self, credentials: &Credentials) -> Result<Identity, LoginError> {
        let token = self
            .inner
            .api
            .login(credentials)
            .await
            .map_err(LoginError::Rejected)?;
        self.inner.store.save(&token);

        match self.inner.api.fetch_identity(&token).await {
            Ok(identity) => {
                if !self.settle(identity.clone()) {
                    return Err(LoginError::Interrupted);
                }
                info!(identity = %identity, "Logged in");
                Ok(identity)
            }
            Err(e) => {
                warn!(error = %e, "Identity fetch failed after login, discarding token");
                self.inner.store.clear();
                self.inner.state.send_if_modified(|state| {
                    if state.is_authenticated() {
                        *state = SessionState::Anonymous;
                        true
                    } else {
                        false
                    }
                });
                Err(LoginError::Identity(e))
            }
        }
    }

    /// Drop the session. Always succeeds; the server is not contacted.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        self.recover().await;
        let _guard = self.inner.transition.lock().await;

        info!("Logging out");
        self.inner.store.clear();
        self.publish(SessionState::Anonymous);
    }

    /// Force a refresh exchange and re-fetch the identity.
    ///
    /// On failure the stored token is discarded; an authenticated session
    /// becomes [`SessionState::Expired`], any other state becomes
    /// [`SessionState::Anonymous`].
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Identity, Error> {
        self.recover().await;
        let _guard = self.inner.transition.lock().await;

        let token = match self.refresher().refresh().await {
            Ok(token) => token,
            Err(e) => {
                if self.inner.store.read().is_none() {
                    self.drop_session(&e.to_string());
                } else {
                    debug!("Refresh failed after a newer token was stored, keeping it");
                }
                return Err(e.into());
            }
        };

        match self.inner.api.fetch_identity(&token).await {
            Ok(identity) => {
                self.settle(identity.clone());
                Ok(identity)
            }
            Err(e) => {
                warn!(error = %e, "Identity fetch failed after refresh");
                self.inner.store.clear();
                self.drop_session(&e.to_string());
                Err(e.into())
            }
        }
    }

    /// Send a request on behalf of the session.
    ///
    /// Behaves like [`AuthorizedClient::request`]. If the refresh-retry
    /// failed, an authenticated session becomes [`SessionState::Expired`].
    /// If it succeeded while no identity was published, the refreshed
    /// session is adopted.
    pub async fn request(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.recover().await;

        let (response, outcome) = self.inner.client.request_with_outcome(request).await?;
        let authenticated = self.inner.state.borrow().is_authenticated();
        if outcome == RetryOutcome::Retried && !authenticated {
            self.adopt_stored_token().await;
        } else {
            self.enforce_invariant();
        }
        Ok(response)
    }

    async fn adopt_stored_token(&self) {
        let _guard = self.inner.transition.lock().await;
        let authenticated = self.inner.state.borrow().is_authenticated();
        if authenticated {
            return;
        }
        let Some(token) = self.inner.store.read() else {
            return;
        };

        match self.inner.api.fetch_identity(&token).await {
            Ok(identity) => {
                info!(identity = %identity, "Adopted refreshed session");
                self.settle(identity);
            }
            Err(e) => {
                warn!(error = %e, "Refreshed token has no identity, discarding it");
                self.inner.store.clear();
            }
        }
    }

    /// Publish `Authenticated` if the token store still holds a token.
    /// Returns false, after publishing `Anonymous`, if it does not.
    fn settle(&self, identity: Identity) -> bool {
        if self.inner.store.read().is_some() {
            self.publish(SessionState::Authenticated(identity));
            true
        } else {
            warn!("Token store emptied before identity was published");
            self.publish(SessionState::Anonymous);
            false
        }
    }

    fn drop_session(&self, reason: &str) {
        self.inner.store.clear();
        let next = if self.inner.state.borrow().is_authenticated() {
            SessionState::Expired {
                reason: reason.to_string(),
            }
        } else {
            SessionState::Anonymous
        };
        self.publish(next);
    }

    /// Expire an authenticated session whose token has disappeared.
    fn enforce_invariant(&self) {
        let store = &self.inner.store;
        let expired = self.inner.state.send_if_modified(|state| {
            if state.is_authenticated() && store.read().is_none() {
                *state = SessionState::Expired {
                    reason: "access token could not be refreshed".to_string(),
                };
                true
            } else {
                false
            }
        });
        if expired {
            warn!("Session expired");
        }
    }

    fn publish(&self, next: SessionState) {
        self.inner.state.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            debug!(from = %state, to = %next, "Session state transition");
            *state = next;
            true
        });
    }
}

fn check_not_empty(credentials: &Credentials) -> Result<(), LoginError> {
    if credentials.email().trim().is_empty() {
        return Err(LoginError::MissingField { field: "email" });
    }
    if credentials.password().is_empty() {
        return Err(LoginError::MissingField { field: "password" });
    }
    Ok(())
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("server", self.inner.api.server())
            .field("state", &*self.inner.state.borrow())
            .finish()
    }
}
