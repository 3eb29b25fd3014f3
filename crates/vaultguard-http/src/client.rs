//! HTTP client plumbing shared by every endpoint.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};
use url::Url;

use vaultguard_core::types::error_detail;
use vaultguard_core::{
    AccessToken, ApiError, ApiRequest, ApiResponse, Method, ProtocolError, ServerUrl,
    TransportError,
};

use crate::config::HttpConfig;

/// Classify a reqwest failure.
pub(crate) fn transport_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// A reqwest client bound to one server, with its own cookie jar.
#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    client: reqwest::Client,
    server: ServerUrl,
    jar: Arc<Jar>,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self, TransportError> {
        let jar = Arc::new(Jar::default());
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .cookie_provider(jar.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(transport_error)?;

        Ok(Self {
            client,
            server: config.server().clone(),
            jar,
        })
    }

    pub fn server(&self) -> &ServerUrl {
        &self.server
    }

    fn url(&self, path: &str) -> String {
        self.server.endpoint(path)
    }

    /// POST a JSON body and decode a JSON response.
    #[instrument(skip(self, body), fields(server = %self.server))]
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        debug!(path, "POST");
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        self.handle_response(response).await
    }

    /// POST a JSON body, discarding any response body.
    #[instrument(skip(self, body), fields(server = %self.server))]
    pub async fn post_json_no_response<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        debug!(path, "POST (no response)");
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        trace!(status = %status, "Response");
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error_response(response).await)
        }
    }

    /// POST without a body. Only cookies from the jar are attached.
    #[instrument(skip(self), fields(server = %self.server))]
    pub async fn post_empty<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        debug!(path, "POST (no body)");
        let response = self
            .client
            .post(self.url(path))
            .send()
            .await
            .map_err(transport_error)?;

        self.handle_response(response).await
    }

    #[instrument(skip(self, token), fields(server = %self.server))]
    pub async fn get_authed<R: DeserializeOwned>(
        &self,
        path: &str,
        token: &AccessToken,
    ) -> Result<R, ApiError> {
        debug!(path, "GET (authenticated)");
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(transport_error)?;

        self.handle_response(response).await
    }

    /// Send a caller-built request and hand back the raw response.
    #[instrument(
        skip(self, request, token),
        fields(server = %self.server, method = %request.method(), path = request.path())
    )]
    pub async fn send(
        &self,
        request: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Result<ApiResponse, ApiError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method()), self.url(request.path()));
        if let Some(token) = token {
            builder = builder.bearer_auth(token.as_str());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        trace!(status, "Response");

        let body = response.bytes().await.map_err(transport_error)?;
        Ok(ApiResponse::new(status, body.to_vec()))
    }

    /// Cookies the jar would send to `path`, as a `Cookie` header value.
    pub fn cookies_for(&self, path: &str) -> Option<String> {
        let url = Url::parse(&self.url(path)).ok()?;
        let header = self.jar.cookies(&url)?;
        header.to_str().ok().map(str::to_string)
    }

    /// Seed the jar with `name=value` pairs as they would be sent to `path`.
    pub fn add_cookies_for(&self, path: &str, cookies: &str) {
        let Ok(url) = Url::parse(&self.url(path)) else {
            return;
        };
        for pair in cookies.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            self.jar.add_cookie_str(pair, &url);
        }
    }

    async fn handle_response<R: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<R, ApiError> {
        let status = response.status();
        trace!(status = %status, "Response");

        if !status.is_success() {
            return Err(self.parse_error_response(response).await);
        }

        let body = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidResponse {
            message: e.to_string(),
        })
    }

    async fn parse_error_response(&self, response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let detail = match response.bytes().await {
            Ok(body) => error_detail(&body),
            Err(_) => None,
        };
        ProtocolError::new(status, detail).into()
    }
}
