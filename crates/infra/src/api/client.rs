//! Per-surface API client
//!
//! Wires the transport, the anti-forgery token store and the interceptor
//! pipeline for one application surface (admin or user dashboard) and
//! exposes typed verbs that return decoded bodies.

use std::sync::Arc;

use pitwall_core::{Navigator, PageTokenSource, SessionStore};
use pitwall_domain::{AppSurface, ClientConfig, PitwallError};
use reqwest::cookie::Jar;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use super::errors::ApiError;
use crate::csrf::CsrfTokenStore;
use crate::http::client::parse_origin;
use crate::http::{ApiRequest, HttpClient, MultipartPayload};
use crate::interceptors::{AuthRedirectStage, CredentialStage, SessionFaultStage};

/// API client for one application surface
pub struct ApiClient {
    surface: AppSurface,
    config: ClientConfig,
    transport: HttpClient,
    csrf: Arc<CsrfTokenStore>,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Client for `surface` with no page-embedded token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the configuration is invalid.
    pub fn for_surface(
        surface: AppSurface,
        config: ClientConfig,
        navigator: Arc<dyn Navigator>,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self, ApiError> {
        Self::builder().surface(surface).config(config).navigator(navigator).session(session).build()
    }

    pub fn surface(&self) -> AppSurface {
        self.surface
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Login route the auth redirect sends this surface to.
    pub fn login_path(&self) -> &str {
        self.surface.login_path(&self.config)
    }

    pub fn transport(&self) -> &HttpClient {
        &self.transport
    }

    /// Anti-forgery token store; tests reset it between cases.
    pub fn csrf(&self) -> &Arc<CsrfTokenStore> {
        &self.csrf
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Send `request` through the full pipeline and return the raw decoded
    /// body (envelope included).
    pub async fn send(
        &self,
        request: ApiRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<Value, ApiError> {
        self.transport.send(&request, cancel).await
    }

    /// Send `request` and decode the body into `T`.
    ///
    /// Empty and 204/205 bodies decode from JSON `null`, so `()` and
    /// `Option<_>` work for endpoints without content.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, ApiError> {
        let body = self.send(request, cancel).await?;
        serde_json::from_value(body)
            .map_err(|e| ApiError::Decode(format!("Failed to parse response: {}", e)))
    }

    /// Execute a GET request
    ///
    /// # Errors
    ///
    /// Returns error if request fails or response cannot be deserialized
    #[instrument(skip(self, cancel), fields(surface = self.surface.as_str()))]
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, ApiError> {
        self.execute(ApiRequest::get(path), cancel).await
    }

    /// Execute a POST request with a JSON body
    ///
    /// # Errors
    ///
    /// Returns error if request fails or response cannot be deserialized
    #[instrument(skip(self, body, cancel), fields(surface = self.surface.as_str()))]
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, ApiError> {
        self.execute(ApiRequest::post(path).json(body)?, cancel).await
    }

    /// Execute a PUT request with a JSON body
    ///
    /// # Errors
    ///
    /// Returns error if request fails or response cannot be deserialized
    #[instrument(skip(self, body, cancel), fields(surface = self.surface.as_str()))]
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, ApiError> {
        self.execute(ApiRequest::put(path).json(body)?, cancel).await
    }

    /// Execute a PATCH request with a JSON body
    ///
    /// # Errors
    ///
    /// Returns error if request fails or response cannot be deserialized
    #[instrument(skip(self, body, cancel), fields(surface = self.surface.as_str()))]
    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, ApiError> {
        self.execute(ApiRequest::patch(path).json(body)?, cancel).await
    }

    /// Execute a DELETE request
    ///
    /// # Errors
    ///
    /// Returns error if request fails or response cannot be deserialized
    #[instrument(skip(self, cancel), fields(surface = self.surface.as_str()))]
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, ApiError> {
        self.execute(ApiRequest::delete(path), cancel).await
    }

    /// Send a multipart body with the given method.
    ///
    /// PUT/PATCH/DELETE go out as POST with a `_method` field when the
    /// configuration asks for it.
    #[instrument(skip(self, payload, cancel), fields(surface = self.surface.as_str()))]
    pub async fn upload<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: MultipartPayload,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, ApiError> {
        self.execute(ApiRequest::new(method, path).multipart(payload), cancel).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("surface", &self.surface)
            .field("transport", &self.transport)
            .field("csrf", &self.csrf)
            .finish_non_exhaustive()
    }
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    surface: Option<AppSurface>,
    config: Option<ClientConfig>,
    navigator: Option<Arc<dyn Navigator>>,
    session: Option<Arc<dyn SessionStore>>,
    page_token: Option<Arc<dyn PageTokenSource>>,
}

impl ApiClientBuilder {
    /// Set the application surface (defaults to the user dashboard)
    pub fn surface(mut self, surface: AppSurface) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Set the client configuration
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the whole-page navigator used by the auth redirect
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Set the client-side session store
    pub fn session(mut self, session: Arc<dyn SessionStore>) -> Self {
        self.session = Some(session);
        self
    }

    /// Set the source of the page-embedded anti-forgery token
    pub fn page_token(mut self, source: Arc<dyn PageTokenSource>) -> Self {
        self.page_token = Some(source);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns error if required fields are missing or client creation fails
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let surface = self.surface.unwrap_or(AppSurface::User);
        let config = self.config.unwrap_or_default();
        let navigator =
            self.navigator.ok_or_else(|| ApiError::Config("Navigator not set".to_string()))?;
        let session =
            self.session.ok_or_else(|| ApiError::Config("Session store not set".to_string()))?;
        let page_token: Arc<dyn PageTokenSource> = match self.page_token {
            Some(source) => source,
            None => Arc::new(None::<String>),
        };

        config.validate().map_err(config_error)?;
        let origin = parse_origin(&config.origin).map_err(config_error)?;

        let jar = Arc::new(Jar::default());
        let csrf = Arc::new(CsrfTokenStore::new(Arc::clone(&jar), origin, page_token));
        let login_path = surface.login_path(&config).to_string();

        let transport = HttpClient::builder()
            .config(&config)
            .cookie_jar(jar)
            .request_stage(Arc::new(CredentialStage::new(Arc::clone(&csrf))))
            .failure_stage(Arc::new(SessionFaultStage::new(Arc::clone(&csrf))))
            .failure_stage(Arc::new(AuthRedirectStage::new(
                navigator,
                Arc::clone(&session),
                login_path,
            )))
            .build()
            .map_err(config_error)?;

        info!(surface = surface.as_str(), origin = %config.origin, "API client ready");
        debug!(pipeline = ?transport.pipeline(), "transport pipeline");

        Ok(ApiClient { surface, config, transport, csrf, session })
    }
}

fn config_error(err: PitwallError) -> ApiError {
    match err {
        PitwallError::Config(message) => ApiError::Config(message),
        other => ApiError::Config(other.to_string()),
    }
}
