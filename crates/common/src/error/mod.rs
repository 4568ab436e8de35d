//! Common error classification utilities
//!
//! This module provides the shared vocabulary every Pitwall error type uses to
//! describe itself to retry logic and to logging.
//!
//! # Error Handling Architecture
//!
//! 1. **`ErrorClassification` trait**: A standard interface for classifying
//!    errors by their characteristics (retryability, severity, criticality)
//!
//! 2. **`ErrorSeverity` enum**: A unified severity level used to pick the log
//!    level a failure is reported at
//!
//! ## ErrorSeverity Levels
//!
//! | Level | Use Case | Examples |
//! |-------|----------|----------|
//! | **Info** | Expected conditions | Cancelled requests, superseded searches |
//! | **Warning** | Rejected by the backend, user can act | Validation failures, 4xx responses |
//! | **Error** | Failure requiring attention | Network errors, 5xx responses, decode failures |
//! | **Critical** | Client integrity at risk | Misconfiguration discovered at runtime |
//!
//! ## Example
//!
//! ```rust,ignore
//! use pitwall_common::error::{ErrorClassification, ErrorSeverity};
//!
//! #[derive(Debug, thiserror::Error)]
//! pub enum WidgetError {
//!     #[error("widget not found: {0}")]
//!     NotFound(String),
//!     #[error("backend unavailable")]
//!     Unavailable,
//! }
//!
//! impl ErrorClassification for WidgetError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, Self::Unavailable)
//!     }
//!
//!     fn severity(&self) -> ErrorSeverity {
//!         match self {
//!             Self::NotFound(_) => ErrorSeverity::Warning,
//!             Self::Unavailable => ErrorSeverity::Error,
//!         }
//!     }
//!
//!     fn is_critical(&self) -> bool {
//!         false
//!     }
//!
//!     fn retry_after(&self) -> Option<Duration> {
//!         None
//!     }
//! }
//! ```

use std::fmt;
use std::time::Duration;

/// Standard trait for classifying errors
///
/// Implementations must be cheap: the methods are called on every failure
/// that crosses a module boundary.
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient issues that may succeed if attempted
    /// again, such as network timeouts or temporary service unavailability.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    ///
    /// Used for monitoring, alerting, and logging decisions.
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool;

    /// Get the suggested retry delay if applicable
    ///
    /// Returns `Some(Duration)` when a specific retry delay is recommended
    /// (e.g., from a Retry-After header), or `None` otherwise.
    fn retry_after(&self) -> Option<Duration>;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Emit a structured tracing event for `error` at the level matching its
/// severity.
///
/// `operation` should be a stable identifier (e.g. `"league.list"`) without
/// request payloads in it.
#[cfg(feature = "observability")]
pub fn report<E>(operation: &str, error: &E)
where
    E: ErrorClassification + fmt::Display + ?Sized,
{
    let severity = error.severity();
    let retryable = error.is_retryable();

    match severity {
        ErrorSeverity::Info => {
            tracing::debug!(operation, %severity, retryable, error = %error, "operation_failed");
        }
        ErrorSeverity::Warning => {
            tracing::warn!(operation, %severity, retryable, error = %error, "operation_failed");
        }
        ErrorSeverity::Error | ErrorSeverity::Critical => {
            tracing::error!(operation, %severity, retryable, error = %error, "operation_failed");
        }
    }
}
