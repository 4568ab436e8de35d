//! Response envelope unwrapping
//!
//! Every endpoint wraps its payload as `{success?, data, message?}`.
//! Collections may add paging information in one of two shapes:
//!
//! - `{success, data: [...], meta: {...}}`
//! - `{data: [...], meta: {...}, links: {...}}`
//!
//! Both normalize into [`Paginated`]. Callers above the service layer only
//! ever see `data` or a `Paginated`.

use pitwall_domain::{PageLinks, PageMeta, Paginated};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::errors::ApiError;

/// Single-resource or list envelope
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    pub data: T,
    #[serde(default)]
    pub message: Option<String>,
}

/// Paginated collection envelope (either shape)
#[derive(Debug, Clone, Deserialize)]
pub struct PageEnvelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    pub data: Vec<T>,
    pub meta: PageMeta,
    #[serde(default)]
    pub links: Option<PageLinks>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> From<PageEnvelope<T>> for Paginated<T> {
    fn from(envelope: PageEnvelope<T>) -> Self {
        Paginated { data: envelope.data, meta: envelope.meta, links: envelope.links }
    }
}

/// Strip the envelope and decode `data`.
///
/// A body without a `data` member is decoded as the payload itself; a few
/// session endpoints answer unwrapped.
pub fn unwrap_data<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    if body.get("data").is_some() {
        let envelope: Envelope<T> = decode(body)?;
        return Ok(envelope.data);
    }
    decode(body)
}

/// Decode a paginated collection in either accepted shape.
pub fn unwrap_page<T: DeserializeOwned>(body: Value) -> Result<Paginated<T>, ApiError> {
    let envelope: PageEnvelope<T> = decode(body)?;
    Ok(envelope.into())
}

/// Discard the body of an endpoint that returns nothing useful.
pub fn unwrap_unit(_body: Value) -> Result<(), ApiError> {
    Ok(())
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body)
        .map_err(|err| ApiError::Decode(format!("unexpected response shape: {err}")))
}
