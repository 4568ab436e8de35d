//! Raw API failure types
//!
//! `ApiError` is what the transport and its interceptors produce. It is not
//! what application code sees: the service layer classifies it once into a
//! [`ClassifiedError`](super::classify::ClassifiedError).

use std::time::Duration;

use pitwall_common::{ErrorClassification, ErrorSeverity};
use pitwall_domain::constants::{
    STATUS_TOKEN_MISMATCH, STATUS_UNAUTHENTICATED, STATUS_VALIDATION_FAILED,
};
use serde_json::Value;
use thiserror::Error;

/// Categories of API failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Caller withdrew interest (token cancelled before or during the call)
    Cancelled,
    /// Session is gone (401)
    Unauthenticated,
    /// Anti-forgery token rejected (419)
    TokenMismatch,
    /// Structured field errors (422)
    Validation,
    /// Other 4xx
    Client,
    /// 5xx
    Server,
    /// Connection, timeout, or body decoding failures
    Network,
    /// Misconfiguration discovered while building a request
    Config,
}

/// API operation errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Request cancelled")]
    Cancelled,

    /// Non-success HTTP response. `body` is the decoded JSON body, a JSON
    /// string holding the raw text when the body was not JSON, or `Null` when
    /// empty.
    #[error("HTTP {status}: {}", summarize_body(body))]
    Http { status: u16, body: Value },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Decoded response body of the failed response, if there was one.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    /// `message` member of a JSON error body.
    pub fn server_message(&self) -> Option<&str> {
        self.body()
            .and_then(|body| body.get("message"))
            .and_then(Value::as_str)
            .filter(|message| !message.trim().is_empty())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn has_status(&self, expected: u16) -> bool {
        self.status() == Some(expected)
    }

    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Cancelled => ApiErrorCategory::Cancelled,
            Self::Http { status, .. } => match *status {
                STATUS_UNAUTHENTICATED => ApiErrorCategory::Unauthenticated,
                STATUS_TOKEN_MISMATCH => ApiErrorCategory::TokenMismatch,
                STATUS_VALIDATION_FAILED => ApiErrorCategory::Validation,
                500..=599 => ApiErrorCategory::Server,
                _ => ApiErrorCategory::Client,
            },
            Self::Network(_) | Self::Timeout(_) | Self::Decode(_) => ApiErrorCategory::Network,
            Self::Config(_) => ApiErrorCategory::Config,
        }
    }
}

impl ErrorClassification for ApiError {
    fn is_retryable(&self) -> bool {
        matches!(self.category(), ApiErrorCategory::Network | ApiErrorCategory::Server)
    }

    fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ApiErrorCategory::Cancelled => ErrorSeverity::Info,
            ApiErrorCategory::Unauthenticated
            | ApiErrorCategory::TokenMismatch
            | ApiErrorCategory::Validation
            | ApiErrorCategory::Client => ErrorSeverity::Warning,
            ApiErrorCategory::Server | ApiErrorCategory::Network => ErrorSeverity::Error,
            ApiErrorCategory::Config => ErrorSeverity::Critical,
        }
    }

    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

fn summarize_body(body: &Value) -> String {
    match body {
        Value::Null => "<empty body>".to_string(),
        Value::String(text) => text.clone(),
        other => other
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| other.to_string(), ToString::to_string),
    }
}
