//! Recovers from an anti-forgery token mismatch (419).

use std::sync::Arc;

use async_trait::async_trait;
use pitwall_domain::constants::{STATUS_TOKEN_MISMATCH, XSRF_HEADER};
use reqwest::header::HeaderMap;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::errors::ApiError;
use crate::csrf::CsrfTokenStore;
use crate::http::{ApiRequest, FailureStage, HttpClient};

/// Refreshes the token and replays the failed request exactly once.
///
/// When the token the failed attempt carried has already been replaced (an
/// overlapping request refreshed it first), the request is replayed without
/// another refresh.
///
/// The replay goes through the request stages again, so it carries the
/// refreshed token, but not through the failure stages: whatever it returns
/// is final.
#[derive(Debug, Clone)]
pub struct SessionFaultStage {
    store: Arc<CsrfTokenStore>,
}

impl SessionFaultStage {
    pub fn new(store: Arc<CsrfTokenStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl FailureStage for SessionFaultStage {
    fn name(&self) -> &'static str {
        "session_fault"
    }

    fn handles(&self, failure: &ApiError) -> bool {
        failure.has_status(STATUS_TOKEN_MISMATCH)
    }

    async fn recover(
        &self,
        transport: &HttpClient,
        request: &ApiRequest,
        sent: &HeaderMap,
        cancel: Option<&CancellationToken>,
        failure: ApiError,
    ) -> Result<Value, ApiError> {
        let sent_token = sent.get(XSRF_HEADER).and_then(|value| value.to_str().ok());
        if self.store.superseded(sent_token) {
            debug!(method = %request.method, path = %request.path, "token already refreshed, replaying");
            return transport.dispatch(request, cancel).await;
        }

        info!(method = %request.method, path = %request.path, "anti-forgery token rejected, refreshing");

        if let Err(refresh_error) = self.store.refresh(transport, cancel).await {
            if refresh_error.is_cancelled() {
                return Err(refresh_error);
            }
            warn!(error = %refresh_error, "anti-forgery refresh failed, giving up on replay");
            return Err(failure);
        }

        transport.dispatch(request, cancel).await
    }
}
