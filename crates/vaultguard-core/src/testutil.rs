//! Scripted in-memory authentication server for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{ApiError, ProtocolError, TransportError};
use crate::traits::AuthApi;
use crate::types::{ApiRequest, ApiResponse, Identity, ServerUrl};
use crate::{AccessToken, Credentials};

enum RefreshStep {
    Issue { token: String, email: String },
    IssueUnusable { token: String },
    Reject { status: u16 },
}

/// An [`AuthApi`] whose behaviour is configured up front.
///
/// Tokens are valid until [`FakeAuthApi::expire`] is called. Refresh
/// outcomes are consumed in order; once the script is exhausted every
/// refresh is rejected with 401.
pub(crate) struct FakeAuthApi {
    server: ServerUrl,
    accounts: Mutex<HashMap<String, (String, String)>>,
    valid_tokens: Mutex<HashMap<String, String>>,
    refresh_script: Mutex<VecDeque<RefreshStep>>,
    refresh_delay: Duration,
    identity_failure: Mutex<Option<u16>>,
    offline: AtomicBool,
    login_calls: AtomicUsize,
    identity_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
    send_calls: AtomicUsize,
}

impl FakeAuthApi {
    pub fn new() -> Self {
        Self {
            server: ServerUrl::new("http://localhost:8000").unwrap(),
            accounts: Mutex::new(HashMap::new()),
            valid_tokens: Mutex::new(HashMap::new()),
            refresh_script: Mutex::new(VecDeque::new()),
            refresh_delay: Duration::ZERO,
            identity_failure: Mutex::new(None),
            offline: AtomicBool::new(false),
            login_calls: AtomicUsize::new(0),
            identity_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            send_calls: AtomicUsize::new(0),
        }
    }

    /// Register an account whose login issues `token`.
    pub fn with_account(self, email: &str, password: &str, token: &str) -> Self {
        self.accounts
            .lock()
            .insert(email.to_string(), (password.to_string(), token.to_string()));
        self
    }

    /// Mark a token as valid for `email` from the start.
    pub fn with_valid_token(self, token: &str, email: &str) -> Self {
        self.valid_tokens
            .lock()
            .insert(token.to_string(), email.to_string());
        self
    }

    pub fn with_refresh_token(self, token: &str, email: &str) -> Self {
        self.refresh_script.lock().push_back(RefreshStep::Issue {
            token: token.to_string(),
            email: email.to_string(),
        });
        self
    }

    /// Queue a refresh that issues a token the server will not accept.
    pub fn with_unusable_refresh_token(self, token: &str) -> Self {
        self.refresh_script.lock().push_back(RefreshStep::IssueUnusable {
            token: token.to_string(),
        });
        self
    }

    pub fn with_refresh_failure(self, status: u16) -> Self {
        self.refresh_script
            .lock()
            .push_back(RefreshStep::Reject { status });
        self
    }

    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    /// Make every identity fetch fail with `status`.
    pub fn fail_identity(&self, status: Option<u16>) {
        *self.identity_failure.lock() = status;
    }

    /// Invalidate a token server-side.
    pub fn expire(&self, token: &str) {
        self.valid_tokens.lock().remove(token);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn identity_calls(&self) -> usize {
        self.identity_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), ApiError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(TransportError::Connection {
                message: "connection refused".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn owner_of(&self, token: &AccessToken) -> Option<String> {
        self.valid_tokens.lock().get(token.as_str()).cloned()
    }
}

fn rejected(status: u16, detail: &str) -> ApiError {
    ProtocolError::new(status, Some(detail.to_string())).into()
}

#[async_trait]
impl AuthApi for FakeAuthApi {
    fn server(&self) -> &ServerUrl {
        &self.server
    }

    async fn login(&self, credentials: &Credentials) -> Result<AccessToken, ApiError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;

        let token = match self.accounts.lock().get(credentials.email()) {
            Some((password, token)) if password == credentials.password() => token.clone(),
            _ => return Err(rejected(401, "Invalid credentials")),
        };
        self.valid_tokens
            .lock()
            .insert(token.clone(), credentials.email().to_string());
        Ok(AccessToken::new(token))
    }

    async fn register(&self, credentials: &Credentials) -> Result<(), ApiError> {
        self.check_online()?;

        let mut accounts = self.accounts.lock();
        if accounts.contains_key(credentials.email()) {
            return Err(rejected(400, "Email already registered"));
        }
        accounts.insert(
            credentials.email().to_string(),
            (
                credentials.password().to_string(),
                format!("token-{}", credentials.email()),
            ),
        );
        Ok(())
    }

    async fn fetch_identity(&self, token: &AccessToken) -> Result<Identity, ApiError> {
        self.identity_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;

        if let Some(status) = *self.identity_failure.lock() {
            return Err(rejected(status, "identity unavailable"));
        }
        self.owner_of(token)
            .map(Identity::new)
            .ok_or_else(|| rejected(401, "Invalid token"))
    }

    async fn refresh(&self) -> Result<AccessToken, ApiError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if !self.refresh_delay.is_zero() {
            tokio::time::sleep(self.refresh_delay).await;
        }
        self.check_online()?;

        match self.refresh_script.lock().pop_front() {
            Some(RefreshStep::Issue { token, email }) => {
                self.valid_tokens.lock().insert(token.clone(), email);
                Ok(AccessToken::new(token))
            }
            Some(RefreshStep::IssueUnusable { token }) => Ok(AccessToken::new(token)),
            Some(RefreshStep::Reject { status }) => Err(rejected(status, "Invalid refresh token")),
            None => Err(rejected(401, "Missing refresh token")),
        }
    }

    async fn send(
        &self,
        request: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Result<ApiResponse, ApiError> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;

        match token.and_then(|t| self.owner_of(t)) {
            Some(email) => Ok(ApiResponse::new(
                200,
                serde_json::json!({ "path": request.path(), "owner": email }).to_string(),
            )),
            None => Ok(ApiResponse::new(401, r#"{"detail":"Not authenticated"}"#)),
        }
    }
}
