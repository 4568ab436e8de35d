//! Sends the page to the login route when the session is gone (401).

use std::sync::Arc;

use async_trait::async_trait;
use pitwall_core::{Navigator, SessionStore};
use pitwall_domain::constants::STATUS_UNAUTHENTICATED;
use reqwest::header::HeaderMap;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::errors::ApiError;
use crate::http::{ApiRequest, FailureStage, HttpClient};

/// Clears client-side session state and navigates to the login route,
/// unless the page already is the login route. The failure is returned to
/// the caller either way.
pub struct AuthRedirectStage {
    navigator: Arc<dyn Navigator>,
    session: Arc<dyn SessionStore>,
    login_path: String,
}

impl AuthRedirectStage {
    pub fn new(
        navigator: Arc<dyn Navigator>,
        session: Arc<dyn SessionStore>,
        login_path: impl Into<String>,
    ) -> Self {
        Self { navigator, session, login_path: login_path.into() }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    fn on_login_page(&self) -> bool {
        let current = self.navigator.current_path();
        current.trim_end_matches('/') == self.login_path.trim_end_matches('/')
    }
}

impl std::fmt::Debug for AuthRedirectStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRedirectStage").field("login_path", &self.login_path).finish()
    }
}

#[async_trait]
impl FailureStage for AuthRedirectStage {
    fn name(&self) -> &'static str {
        "auth_redirect"
    }

    fn handles(&self, failure: &ApiError) -> bool {
        failure.has_status(STATUS_UNAUTHENTICATED)
    }

    async fn recover(
        &self,
        _transport: &HttpClient,
        request: &ApiRequest,
        _sent: &HeaderMap,
        _cancel: Option<&CancellationToken>,
        failure: ApiError,
    ) -> Result<Value, ApiError> {
        if self.on_login_page() {
            debug!(path = %request.path, "unauthenticated while on the login page, not redirecting");
        } else {
            info!(path = %request.path, login = %self.login_path, "session expired, redirecting to login");
            self.session.clear();
            self.navigator.redirect(&self.login_path);
        }

        Err(failure)
    }
}
