//! Transport configuration.

use std::time::Duration;

use vaultguard_core::ServerUrl;

/// User agent sent with every request unless overridden.
pub const DEFAULT_USER_AGENT: &str = concat!("vaultguard/", env!("CARGO_PKG_VERSION"));

/// Settings for [`HttpAuthApi`](crate::HttpAuthApi).
#[derive(Debug, Clone)]
pub struct HttpConfig {
    server: ServerUrl,
    user_agent: String,
    timeout: Option<Duration>,
}

impl HttpConfig {
    /// Configuration for `server` with the default user agent and no timeout.
    pub fn new(server: ServerUrl) -> Self {
        Self {
            server,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Fail any request that takes longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn server(&self) -> &ServerUrl {
        &self.server
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}
