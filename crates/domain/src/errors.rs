//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Pitwall
///
/// Covers failures that happen outside a single API call: building clients,
/// loading configuration, wiring collaborators. Per-call failures use the
/// infrastructure crate's `ApiError` / `ClassifiedError` instead.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum PitwallError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Pitwall operations
pub type Result<T> = std::result::Result<T, PitwallError>;
