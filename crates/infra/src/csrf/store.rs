//! Anti-forgery token store
//!
//! Holds the token attached to state-changing requests. Resolution order is
//! in-memory cache, then the token embedded in the page, then the
//! `XSRF-TOKEN` cookie; the first non-empty value wins and seeds the cache.
//!
//! A token mismatch invalidates the cache and triggers a refresh. Concurrent
//! mismatches share one in-flight refresh, so the backend sees a single
//! refresh request however many waiters pile up behind it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use pitwall_core::PageTokenSource;
use pitwall_domain::constants::XSRF_COOKIE;
use reqwest::cookie::{CookieStore, Jar};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::api::errors::ApiError;
use crate::cancellation::run_cancellable;
use crate::http::HttpClient;

type SharedRefresh = Shared<BoxFuture<'static, Result<(), ApiError>>>;

/// Where a resolved token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Cache,
    PageMeta,
    Cookie,
}

impl TokenSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::PageMeta => "page_meta",
            Self::Cookie => "cookie",
        }
    }
}

/// Owned, injectable anti-forgery token state for one transport.
pub struct CsrfTokenStore {
    cached: RwLock<Option<String>>,
    page: Arc<dyn PageTokenSource>,
    jar: Arc<Jar>,
    origin: Url,
    in_flight: Mutex<Option<SharedRefresh>>,
    refreshes: AtomicU64,
}

impl CsrfTokenStore {
    /// Store reading cookies for `origin` out of `jar`.
    ///
    /// `jar` must be the jar the transport sends with, otherwise refreshed
    /// cookies are never seen.
    pub fn new(jar: Arc<Jar>, origin: Url, page: Arc<dyn PageTokenSource>) -> Self {
        Self {
            cached: RwLock::new(None),
            page,
            jar,
            origin,
            in_flight: Mutex::new(None),
            refreshes: AtomicU64::new(0),
        }
    }

    /// Resolve the current token, seeding the cache on first read.
    pub fn token(&self) -> Option<String> {
        self.resolve().map(|(token, _)| token)
    }

    /// Resolve the current token and report its source.
    pub fn resolve(&self) -> Option<(String, TokenSource)> {
        if let Some(token) = self.cached() {
            return Some((token, TokenSource::Cache));
        }

        let (token, source) = match non_empty(self.page.meta_token()) {
            Some(token) => (token, TokenSource::PageMeta),
            None => (self.cookie_token()?, TokenSource::Cookie),
        };

        self.init(token.clone());
        Some((token, source))
    }

    /// Seed the cache unless it already holds a token.
    pub fn init(&self, token: impl Into<String>) {
        let mut cached = self.cached.write();
        if cached.is_none() {
            *cached = non_empty(Some(token.into()));
        }
    }

    /// Replace the cached token.
    pub fn set(&self, token: impl Into<String>) {
        *self.cached.write() = non_empty(Some(token.into()));
    }

    /// Forget the cached token; the next read goes back to page and cookie.
    pub fn invalidate(&self) {
        *self.cached.write() = None;
    }

    /// Return to the initial state: no cached token, no refresh in flight.
    pub fn reset(&self) {
        self.invalidate();
        *self.in_flight.lock() = None;
        self.refreshes.store(0, Ordering::SeqCst);
    }

    pub fn cached(&self) -> Option<String> {
        self.cached.read().clone()
    }

    /// Number of refresh requests this store has started.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// `XSRF-TOKEN` cookie for the origin, URL-decoded.
    pub fn cookie_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.origin)?;
        let cookies = header.to_str().ok()?;

        cookies
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == XSRF_COOKIE)
            .and_then(|(_, value)| urlencoding::decode(value).ok())
            .and_then(|value| non_empty(Some(value.into_owned())))
    }

    /// Invalidate the cache and wait for a fresh cookie.
    ///
    /// Joins the refresh already in flight when there is one; otherwise
    /// starts a new one through `transport`. The refresh runs to completion
    /// even if every waiter is cancelled, so a later waiter does not have to
    /// start over. On success the refreshed cookie becomes the cached token;
    /// a refresh that leaves no cookie behind is an error.
    pub async fn refresh(
        &self,
        transport: &HttpClient,
        cancel: Option<&CancellationToken>,
    ) -> Result<(), ApiError> {
        let refresh = self.join_or_start(transport);

        run_cancellable(cancel, refresh).await?;

        let Some(token) = self.cookie_token() else {
            warn!("anti-forgery refresh completed without an XSRF-TOKEN cookie");
            return Err(ApiError::Network(
                "anti-forgery refresh did not issue an XSRF-TOKEN cookie".into(),
            ));
        };
        self.set(token);
        Ok(())
    }

    /// Whether the cache already holds a token other than `sent`.
    ///
    /// A rejected attempt whose token has since been replaced needs a replay,
    /// not another refresh.
    pub fn superseded(&self, sent: Option<&str>) -> bool {
        match (self.cached(), sent) {
            (Some(cached), Some(sent)) => cached != sent,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    fn join_or_start(&self, transport: &HttpClient) -> SharedRefresh {
        let mut slot = self.in_flight.lock();

        if let Some(pending) = slot.as_ref().filter(|pending| pending.peek().is_none()) {
            debug!("joining in-flight anti-forgery refresh");
            return pending.clone();
        }

        self.invalidate();
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        debug!("starting anti-forgery refresh");

        let transport = transport.clone();
        let refresh = async move { transport.refresh_csrf_cookie().await }.boxed().shared();
        tokio::spawn(refresh.clone());
        *slot = Some(refresh.clone());
        refresh
    }
}

impl fmt::Debug for CsrfTokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfTokenStore")
            .field("origin", &self.origin.as_str())
            .field("cached", &self.cached.read().is_some())
            .field("refreshes", &self.refresh_count())
            .finish_non_exhaustive()
    }
}

fn non_empty(token: Option<String>) -> Option<String> {
    token.filter(|value| !value.trim().is_empty())
}
