//! Attaches the anti-forgery token to state-changing requests.

use std::sync::Arc;

use pitwall_domain::constants::{CSRF_HEADER, XSRF_HEADER};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, trace, warn};

use crate::csrf::CsrfTokenStore;
use crate::http::{ApiRequest, RequestStage};

/// Sets `X-CSRF-TOKEN` and `X-XSRF-TOKEN` to the same resolved token on
/// POST/PUT/PATCH/DELETE. Other methods pass through untouched, as does a
/// request for which no token can be resolved.
#[derive(Debug, Clone)]
pub struct CredentialStage {
    store: Arc<CsrfTokenStore>,
}

impl CredentialStage {
    pub fn new(store: Arc<CsrfTokenStore>) -> Self {
        Self { store }
    }
}

impl RequestStage for CredentialStage {
    fn name(&self) -> &'static str {
        "credential"
    }

    fn apply(&self, request: &ApiRequest, headers: &mut HeaderMap) {
        if !request.is_state_changing() {
            return;
        }

        let Some((token, source)) = self.store.resolve() else {
            debug!(method = %request.method, path = %request.path, "no anti-forgery token available");
            return;
        };

        match HeaderValue::from_str(&token) {
            Ok(value) => {
                trace!(source = source.as_str(), "attaching anti-forgery token");
                headers.insert(CSRF_HEADER, value.clone());
                headers.insert(XSRF_HEADER, value);
            }
            Err(_) => warn!(source = source.as_str(), "anti-forgery token is not a valid header value"),
        }
    }
}
