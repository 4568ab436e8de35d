use std::sync::Arc;
use std::time::Duration;

use pitwall_domain::{ClientConfig, PitwallError};
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, StatusCode};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use url::Url;

use super::pipeline::{FailureStage, Pipeline, RequestStage};
use super::request::{ApiRequest, RequestBody};
use crate::api::errors::ApiError;
use crate::cancellation::run_cancellable;
use crate::errors::InfraError;

const JSON: &str = "application/json";

/// Cookie-carrying HTTP transport bound to one backend origin.
///
/// Every request goes through the configured [`Pipeline`]; the decoded body
/// is returned and the raw response never leaves this module.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    jar: Arc<Jar>,
    origin: Url,
    api_base: String,
    csrf_refresh_url: Url,
    timeout: Duration,
    method_override: bool,
    pipeline: Arc<Pipeline>,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Backend origin, e.g. `https://league.example.com`.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Cookie store shared with every request this client sends.
    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.jar
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Absolute URL of an API path.
    pub fn api_url(&self, path: &str) -> String {
        if path.is_empty() || path.starts_with('/') {
            format!("{}{}", self.api_base, path)
        } else {
            format!("{}/{}", self.api_base, path)
        }
    }

    /// Send `request` and let the failure stages handle a failed response.
    ///
    /// At most one failure stage runs. A cancelled request never reaches the
    /// failure stages.
    #[instrument(skip(self, request, cancel), fields(method = %request.method, path = %request.path))]
    pub async fn send(
        &self,
        request: &ApiRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<Value, ApiError> {
        let (sent, result) = self.attempt(request, cancel).await;
        let failure = match result {
            Ok(body) => return Ok(body),
            Err(failure) => failure,
        };

        if failure.is_cancelled() {
            return Err(failure);
        }

        match self.pipeline.failure_stage_for(&failure) {
            Some(stage) => {
                debug!(stage = stage.name(), status = ?failure.status(), "failure stage engaged");
                stage.recover(self, request, &sent, cancel, failure).await
            }
            None => Err(failure),
        }
    }

    /// Send `request` through the request stages only.
    ///
    /// This is the replay path: failures are returned as they are.
    pub async fn dispatch(
        &self,
        request: &ApiRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<Value, ApiError> {
        self.attempt(request, cancel).await.1
    }

    /// One network attempt. Returns the headers the request stages produced
    /// alongside the outcome.
    async fn attempt(
        &self,
        request: &ApiRequest,
        cancel: Option<&CancellationToken>,
    ) -> (HeaderMap, Result<Value, ApiError>) {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            debug!(method = %request.method, path = %request.path, "request cancelled before dispatch");
            return (HeaderMap::new(), Err(ApiError::Cancelled));
        }

        let mut headers = HeaderMap::new();
        self.pipeline.apply_request_stages(request, &mut headers);

        let builder = match self.build_request(request, headers.clone()) {
            Ok(builder) => builder,
            Err(err) => return (headers, Err(err)),
        };
        let url = self.api_url(&request.path);
        debug!(method = %request.method, %url, "sending HTTP request");

        let result = run_cancellable(cancel, self.exchange(builder)).await;
        match &result {
            Ok(_) => debug!(method = %request.method, %url, "received HTTP response"),
            Err(ApiError::Cancelled) => debug!(method = %request.method, %url, "HTTP request aborted"),
            Err(err) => debug!(method = %request.method, %url, error = %err, "HTTP request failed"),
        }
        (headers, result)
    }

    /// Ask the backend to (re)issue the anti-forgery cookie.
    ///
    /// Goes straight to the network: no request or failure stage runs.
    pub async fn refresh_csrf_cookie(&self) -> Result<(), ApiError> {
        debug!(url = %self.csrf_refresh_url, "requesting fresh anti-forgery cookie");
        let builder = self.client.request(Method::GET, self.csrf_refresh_url.clone());
        self.exchange(builder).await.map(|_| ())
    }

    fn build_request(
        &self,
        request: &ApiRequest,
        headers: HeaderMap,
    ) -> Result<RequestBuilder, ApiError> {
        let (method, overridden) = request.wire_method(self.method_override);

        let mut builder = self.client.request(method, self.api_url(&request.path)).headers(headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(payload) => builder.multipart(payload.to_form(overridden.as_ref())?),
        };

        Ok(builder)
    }

    async fn exchange(&self, builder: RequestBuilder) -> Result<Value, ApiError> {
        let response = builder.send().await.map_err(|err| self.map_transport_error(err))?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|err| self.map_transport_error(err))?;

        if !status.is_success() {
            return Err(ApiError::Http { status: status.as_u16(), body: decode_error_body(&bytes) });
        }

        // 204/205 carry no body by definition; some endpoints also answer 200
        // with an empty one.
        if status == StatusCode::NO_CONTENT
            || status == StatusCode::RESET_CONTENT
            || bytes.iter().all(u8::is_ascii_whitespace)
        {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes)
            .map_err(|err| ApiError::Decode(format!("Failed to parse response: {err}")))
    }

    fn map_transport_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            return ApiError::Timeout(self.timeout);
        }
        let infra: InfraError = err.into();
        ApiError::from(infra)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .field("method_override", &self.method_override)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

/// Error bodies are kept whole: JSON when they parse, raw text otherwise.
fn decode_error_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// Builder for [`HttpClient`].
pub struct HttpClientBuilder {
    origin: Option<String>,
    api_prefix: String,
    csrf_refresh_path: String,
    timeout: Duration,
    method_override: bool,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
    cookie_jar: Option<Arc<Jar>>,
    pipeline: Pipeline,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        let defaults = ClientConfig::default();
        Self {
            origin: None,
            api_prefix: defaults.api_prefix,
            csrf_refresh_path: defaults.csrf_refresh_path,
            timeout: Duration::from_secs(defaults.timeout_seconds),
            method_override: defaults.multipart_method_override,
            user_agent: None,
            default_headers: None,
            cookie_jar: None,
            pipeline: Pipeline::new(),
        }
    }
}

impl HttpClientBuilder {
    /// Take origin, paths, timeout and user agent from `config`.
    pub fn config(mut self, config: &ClientConfig) -> Self {
        self.origin = Some(config.origin.clone());
        self.api_prefix = config.api_prefix.clone();
        self.csrf_refresh_path = config.csrf_refresh_path.clone();
        self.timeout = Duration::from_secs(config.timeout_seconds);
        self.method_override = config.multipart_method_override;
        self.user_agent = config.user_agent.clone();
        self
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    pub fn csrf_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.csrf_refresh_path = path.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send multipart PUT/PATCH/DELETE as POST with a `_method` field.
    pub fn method_override(mut self, enabled: bool) -> Self {
        self.method_override = enabled;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Share an existing cookie store (the anti-forgery token store reads
    /// from the same jar).
    pub fn cookie_jar(mut self, jar: Arc<Jar>) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    pub fn request_stage(mut self, stage: Arc<dyn RequestStage>) -> Self {
        self.pipeline.push_request_stage(stage);
        self
    }

    pub fn failure_stage(mut self, stage: Arc<dyn FailureStage>) -> Self {
        self.pipeline.push_failure_stage(stage);
        self
    }

    pub fn build(self) -> Result<HttpClient, PitwallError> {
        let raw_origin = self
            .origin
            .ok_or_else(|| PitwallError::Config("HTTP client origin not set".into()))?;
        let origin = parse_origin(&raw_origin)?;
        let origin_str = origin.as_str().trim_end_matches('/').to_string();

        let api_base = format!("{}{}", origin_str, self.api_prefix.trim_end_matches('/'));
        let csrf_refresh_url = Url::parse(&format!("{}{}", origin_str, self.csrf_refresh_path))
            .map_err(|err| PitwallError::Config(format!("invalid CSRF refresh path: {err}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
        if let Some(extra) = self.default_headers {
            headers.extend(extra);
        }

        let jar = self.cookie_jar.unwrap_or_default();

        let mut builder = ReqwestClient::builder()
            .timeout(self.timeout)
            .cookie_provider(Arc::clone(&jar))
            .default_headers(headers)
            .no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            PitwallError::from(infra)
        })?;

        Ok(HttpClient {
            client,
            jar,
            origin,
            api_base,
            csrf_refresh_url,
            timeout: self.timeout,
            method_override: self.method_override,
            pipeline: Arc::new(self.pipeline),
        })
    }
}

/// Parse and check a backend origin (scheme and host, no path).
pub(crate) fn parse_origin(raw: &str) -> Result<Url, PitwallError> {
    let url = Url::parse(raw.trim())
        .map_err(|err| PitwallError::Config(format!("invalid origin '{raw}': {err}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(PitwallError::Config(format!("origin '{raw}' must use http or https")));
    }
    if url.host_str().is_none() {
        return Err(PitwallError::Config(format!("origin '{raw}' has no host")));
    }
    if url.path() != "/" || url.query().is_some() {
        return Err(PitwallError::Config(format!("origin '{raw}' must not carry a path or query")));
    }

    Ok(url)
}
