//! Failure classification at the service boundary
//!
//! A raw [`ApiError`] is classified exactly once, in this order:
//!
//! 1. cancelled request: [`ClassifiedError::Cancelled`]
//! 2. 422 with a structured `errors` body: [`ClassifiedError::ValidationFailed`],
//!    carrying the original failure untouched
//! 3. any other HTTP failure: [`ClassifiedError::HttpFailure`]
//! 4. anything else: [`ClassifiedError::Unknown`]
//!
//! [`route`] and [`settle`] turn cancellation into a quiet `None` so callers
//! that only care about real failures never see it.

use std::collections::BTreeMap;
use std::time::Duration;

use pitwall_common::{report, ErrorClassification, ErrorSeverity};
use pitwall_domain::constants::{GENERIC_UNKNOWN_MESSAGE, STATUS_VALIDATION_FAILED};
use serde_json::Value;
use thiserror::Error;

use super::errors::ApiError;

/// Field name → messages, as sent in a validation error body
pub type FieldErrors = BTreeMap<String, Vec<String>>;

const VALIDATION_FALLBACK_MESSAGE: &str = "The given data was invalid.";

/// The one error type that crosses the service boundary
#[derive(Debug, Clone, Error)]
pub enum ClassifiedError {
    #[error("Request cancelled")]
    Cancelled,

    #[error("{message}")]
    ValidationFailed {
        message: String,
        errors: FieldErrors,
        /// The untouched transport failure, structured body included
        source: ApiError,
    },

    #[error("{message}")]
    HttpFailure { status: u16, message: String },

    #[error("{message}")]
    Unknown { message: String },
}

impl ClassifiedError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// HTTP status, for the variants that came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ValidationFailed { source, .. } => source.status(),
            Self::HttpFailure { status, .. } => Some(*status),
            Self::Cancelled | Self::Unknown { .. } => None,
        }
    }

    /// Original failure of a validation error.
    pub fn original(&self) -> Option<&ApiError> {
        match self {
            Self::ValidationFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl ErrorClassification for ClassifiedError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::HttpFailure { status, .. } => *status >= 500,
            Self::Cancelled | Self::ValidationFailed { .. } | Self::Unknown { .. } => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Cancelled => ErrorSeverity::Info,
            Self::ValidationFailed { .. } => ErrorSeverity::Warning,
            Self::HttpFailure { status, .. } if *status < 500 => ErrorSeverity::Warning,
            Self::HttpFailure { .. } | Self::Unknown { .. } => ErrorSeverity::Error,
        }
    }

    fn is_critical(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Classify a raw failure.
pub fn classify(error: ApiError) -> ClassifiedError {
    let (status, body) = match &error {
        ApiError::Cancelled => return ClassifiedError::Cancelled,
        ApiError::Http { status, body } => (*status, body),
        ApiError::Network(_) | ApiError::Timeout(_) | ApiError::Decode(_) | ApiError::Config(_) => {
            return ClassifiedError::Unknown { message: GENERIC_UNKNOWN_MESSAGE.to_string() };
        }
    };

    if status == STATUS_VALIDATION_FAILED {
        if let Some(errors) = extract_field_errors(body) {
            let message = body_message(body).unwrap_or(VALIDATION_FALLBACK_MESSAGE).to_string();
            return ClassifiedError::ValidationFailed { message, errors, source: error };
        }
    }

    let message = body_message(body)
        .map_or_else(|| format!("Request failed with status {status}"), ToString::to_string);
    ClassifiedError::HttpFailure { status, message }
}

/// Classify and log a failure of `operation`.
///
/// `Ok(())` means the request was cancelled and the caller should carry on
/// quietly; every other failure comes back classified.
pub fn route(operation: &str, error: ApiError) -> Result<(), ClassifiedError> {
    if !error.is_cancelled() {
        report(operation, &error);
    }
    match classify(error) {
        ClassifiedError::Cancelled => Ok(()),
        classified => Err(classified),
    }
}

/// Settle a transport result: `Some(value)` on success, `None` when
/// cancelled, a classified error otherwise.
pub fn settle<T>(operation: &str, result: Result<T, ApiError>) -> Result<Option<T>, ClassifiedError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(error) => route(operation, error).map(|()| None),
    }
}

/// Message suitable for a transient notification.
///
/// Cancellation has no user-facing message and yields an empty string.
pub fn error_message(error: &ClassifiedError) -> String {
    match error {
        ClassifiedError::Cancelled => String::new(),
        ClassifiedError::ValidationFailed { message, .. }
        | ClassifiedError::HttpFailure { message, .. }
        | ClassifiedError::Unknown { message } => message.clone(),
    }
}

/// Per-field messages of a validation failure.
pub fn field_errors(error: &ClassifiedError) -> Option<&FieldErrors> {
    match error {
        ClassifiedError::ValidationFailed { errors, .. } => Some(errors),
        _ => None,
    }
}

pub fn is_cancelled(error: &ClassifiedError) -> bool {
    error.is_cancelled()
}

fn body_message(body: &Value) -> Option<&str> {
    body.get("message").and_then(Value::as_str).filter(|message| !message.trim().is_empty())
}

/// `errors` member of a validation body, when every entry is a list of
/// strings (a bare string is accepted as a one-item list).
fn extract_field_errors(body: &Value) -> Option<FieldErrors> {
    let entries = body.get("errors")?.as_object()?;
    let mut errors = FieldErrors::new();

    for (field, messages) in entries {
        let messages = match messages {
            Value::Array(items) => {
                items.iter().map(|item| item.as_str().map(ToString::to_string)).collect::<Option<Vec<_>>>()?
            }
            Value::String(single) => vec![single.clone()],
            _ => return None,
        };
        errors.insert(field.clone(), messages);
    }

    Some(errors)
}
