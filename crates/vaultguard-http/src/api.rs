//! HTTP-backed authentication server.

use async_trait::async_trait;
use tracing::{debug, instrument};

use vaultguard_core::traits::AuthApi;
use vaultguard_core::{
    AccessToken, ApiError, ApiRequest, ApiResponse, Credentials, Identity, ServerUrl,
    TransportError,
};

use crate::client::HttpClient;
use crate::config::HttpConfig;
use crate::endpoints::{self, CredentialsRequest, TokenResponse};

/// An [`AuthApi`] speaking the VaultGuard HTTP contract.
///
/// The refresh credential is an HTTP-only cookie that lives in this
/// instance's cookie jar. It is set by the server on login or refresh and
/// attached automatically to `POST /auth/refresh`. Use
/// [`HttpAuthApi::export_cookies`] and [`HttpAuthApi::import_cookies`] to
/// carry it across process restarts.
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: HttpClient,
}

impl HttpAuthApi {
    /// Create a transport with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: HttpConfig) -> Result<Self, TransportError> {
        Ok(Self {
            client: HttpClient::new(&config)?,
        })
    }

    /// Create a transport for `server` with default settings.
    pub fn for_server(server: ServerUrl) -> Result<Self, TransportError> {
        Self::new(HttpConfig::new(server))
    }

    /// The cookies the refresh endpoint would receive, if any.
    pub fn export_cookies(&self) -> Option<String> {
        self.client.cookies_for(endpoints::REFRESH)
    }

    /// Restore cookies previously returned by [`HttpAuthApi::export_cookies`].
    pub fn import_cookies(&self, cookies: &str) {
        self.client.add_cookies_for(endpoints::REFRESH, cookies);
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    fn server(&self) -> &ServerUrl {
        self.client.server()
    }

    #[instrument(skip(self, credentials))]
    async fn login(&self, credentials: &Credentials) -> Result<AccessToken, ApiError> {
        debug!(email = credentials.email(), "Logging in");
        let body = CredentialsRequest {
            email: credentials.email(),
            password: credentials.password(),
        };
        let response: TokenResponse = self.client.post_json(endpoints::LOGIN, &body).await?;
        Ok(AccessToken::new(response.access_token))
    }

    #[instrument(skip(self, credentials))]
    async fn register(&self, credentials: &Credentials) -> Result<(), ApiError> {
        debug!(email = credentials.email(), "Registering account");
        let body = CredentialsRequest {
            email: credentials.email(),
            password: credentials.password(),
        };
        self.client
            .post_json_no_response(endpoints::REGISTER, &body)
            .await
    }

    #[instrument(skip(self, token))]
    async fn fetch_identity(&self, token: &AccessToken) -> Result<Identity, ApiError> {
        self.client.get_authed(endpoints::ME, token).await
    }

    #[instrument(skip(self))]
    async fn refresh(&self) -> Result<AccessToken, ApiError> {
        let response: TokenResponse = self.client.post_empty(endpoints::REFRESH).await?;
        Ok(AccessToken::new(response.access_token))
    }

    async fn send(
        &self,
        request: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Result<ApiResponse, ApiError> {
        self.client.send(request, token).await
    }
}
