//! Bearer-authenticated requests with one refresh-retry.

use std::sync::Arc;

use tracing::{debug, instrument, trace, warn};

use crate::error::ApiError;
use crate::refresh::RefreshCoordinator;
use crate::traits::{AuthApi, TokenStore};
use crate::types::{ApiRequest, ApiResponse};

/// What happened to the refresh-retry of a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RetryOutcome {
    /// The first response was not a 401.
    NotNeeded,
    /// A refresh succeeded and the request was sent again.
    Retried,
    /// The refresh failed; the original 401 is returned.
    RefreshFailed,
}

/// Sends requests with the stored access token attached.
///
/// A 401 triggers exactly one refresh through the shared
/// [`RefreshCoordinator`] and, if it succeeds, exactly one retry. The retry's
/// response is returned whatever its status.
#[derive(Clone)]
pub struct AuthorizedClient {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn TokenStore>,
    refresher: RefreshCoordinator,
}

impl AuthorizedClient {
    pub fn new(
        api: Arc<dyn AuthApi>,
        store: Arc<dyn TokenStore>,
        refresher: RefreshCoordinator,
    ) -> Self {
        Self {
            api,
            store,
            refresher,
        }
    }

    /// Send a request.
    ///
    /// # Errors
    ///
    /// Only transport-level failures are errors. A 401 that survives the
    /// refresh-retry is returned as a response.
    pub async fn request(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.request_with_outcome(request)
            .await
            .map(|(response, _)| response)
    }

    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    pub(crate) async fn request_with_outcome(
        &self,
        request: &ApiRequest,
    ) -> Result<(ApiResponse, RetryOutcome), ApiError> {
        let token = self.store.read();
        if token.is_none() {
            debug!("No stored token, sending without authorization");
        }

        let response = self.api.send(request, token.as_ref()).await?;
        trace!(status = response.status(), "Response");

        if !response.is_unauthorized() {
            return Ok((response, RetryOutcome::NotNeeded));
        }

        debug!("Request unauthorized, attempting refresh");
        match self.refresher.refresh().await {
            Ok(token) => {
                let retried = self.api.send(request, Some(&token)).await?;
                trace!(status = retried.status(), "Retry response");
                Ok((retried, RetryOutcome::Retried))
            }
            Err(e) => {
                warn!(error = %e, "Refresh failed, returning unauthorized response");
                Ok((response, RetryOutcome::RefreshFailed))
            }
        }
    }

    pub fn refresher(&self) -> &RefreshCoordinator {
        &self.refresher
    }
}

impl std::fmt::Debug for AuthorizedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedClient")
            .field("server", self.api.server())
            .finish()
    }
}
