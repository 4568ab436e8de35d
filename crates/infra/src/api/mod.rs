//! API client for the Pitwall backend
//!
//! This module provides the per-surface API client, the raw failure type
//! produced by the transport, envelope unwrapping and the classification of
//! failures at the service boundary.
//!
//! # Architecture
//!
//! - `client`: typed verbs over the cookie-carrying transport
//! - `envelope`: `{data, meta?, links?}` unwrapping and page normalization
//! - `errors`: raw transport failures (`ApiError`)
//! - `classify`: the four-way `ClassifiedError` taxonomy

pub mod classify;
pub mod client;
pub mod envelope;
pub mod errors;

pub use classify::{
    classify, error_message, field_errors, is_cancelled, route, settle, ClassifiedError,
    FieldErrors,
};
pub use client::{ApiClient, ApiClientBuilder};
pub use envelope::{unwrap_data, unwrap_page, unwrap_unit, Envelope, PageEnvelope};
pub use errors::{ApiError, ApiErrorCategory};
