//! Typed middleware stages around the transport
//!
//! Request stages run, in order, on every outgoing attempt (including
//! replays). Failure stages are consulted in declaration order for a failed
//! first attempt; the first one whose [`FailureStage::handles`] returns true
//! owns the outcome and no later stage runs.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::client::HttpClient;
use super::request::ApiRequest;
use crate::api::errors::ApiError;

/// Mutates outgoing headers before a request hits the network.
pub trait RequestStage: Send + Sync {
    /// Stable name for logs.
    fn name(&self) -> &'static str;

    fn apply(&self, request: &ApiRequest, headers: &mut HeaderMap);
}

/// Handles a failed response on behalf of the caller.
#[async_trait]
pub trait FailureStage: Send + Sync {
    /// Stable name for logs.
    fn name(&self) -> &'static str;

    /// Whether this stage takes ownership of `failure`.
    fn handles(&self, failure: &ApiError) -> bool;

    /// Produce the final outcome for the request.
    ///
    /// `transport` is the client that sent the request and `sent` the headers
    /// the failed attempt carried. Stages that replay must use
    /// [`HttpClient::dispatch`] so that the replay never re-enters the
    /// failure stages.
    async fn recover(
        &self,
        transport: &HttpClient,
        request: &ApiRequest,
        sent: &HeaderMap,
        cancel: Option<&CancellationToken>,
        failure: ApiError,
    ) -> Result<Value, ApiError>;
}

/// Ordered stage lists owned by a transport
#[derive(Clone, Default)]
pub struct Pipeline {
    request_stages: Vec<Arc<dyn RequestStage>>,
    failure_stages: Vec<Arc<dyn FailureStage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_request_stage(&mut self, stage: Arc<dyn RequestStage>) {
        self.request_stages.push(stage);
    }

    pub fn push_failure_stage(&mut self, stage: Arc<dyn FailureStage>) {
        self.failure_stages.push(stage);
    }

    pub(crate) fn apply_request_stages(&self, request: &ApiRequest, headers: &mut HeaderMap) {
        for stage in &self.request_stages {
            stage.apply(request, headers);
        }
    }

    /// First failure stage willing to handle `failure`.
    pub(crate) fn failure_stage_for(&self, failure: &ApiError) -> Option<&Arc<dyn FailureStage>> {
        self.failure_stages.iter().find(|stage| stage.handles(failure))
    }

    pub fn request_stage_names(&self) -> Vec<&'static str> {
        self.request_stages.iter().map(|stage| stage.name()).collect()
    }

    pub fn failure_stage_names(&self) -> Vec<&'static str> {
        self.failure_stages.iter().map(|stage| stage.name()).collect()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("request_stages", &self.request_stage_names())
            .field("failure_stages", &self.failure_stage_names())
            .finish()
    }
}
