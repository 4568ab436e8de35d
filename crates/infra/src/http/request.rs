//! Replayable request descriptions
//!
//! A `reqwest::RequestBuilder` with a multipart body cannot be cloned, so the
//! transport keeps its own description of every call and rebuilds the reqwest
//! request for each attempt. The session-fault replay relies on this.

use std::fmt;

use pitwall_domain::constants::METHOD_OVERRIDE_FIELD;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::api::errors::ApiError;

/// One file inside a multipart body
#[derive(Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("field", &self.field)
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Multipart body kept as plain data so it can be sent more than once
#[derive(Debug, Clone, Default)]
pub struct MultipartPayload {
    fields: Vec<(String, String)>,
    files: Vec<FilePart>,
}

impl MultipartPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.files.push(FilePart {
            field: field.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        });
        self
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn files(&self) -> &[FilePart] {
        &self.files
    }

    /// Build a fresh reqwest form, optionally carrying the method override
    /// field.
    pub(crate) fn to_form(&self, method_override: Option<&Method>) -> Result<Form, ApiError> {
        let mut form = Form::new();

        if let Some(method) = method_override {
            form = form.text(METHOD_OVERRIDE_FIELD, method.as_str().to_string());
        }

        for (name, value) in &self.fields {
            form = form.text(name.clone(), value.clone());
        }

        for file in &self.files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.mime)
                .map_err(|err| {
                    ApiError::Config(format!("invalid MIME type '{}': {err}", file.mime))
                })?;
            form = form.part(file.field.clone(), part);
        }

        Ok(form)
    }
}

/// Request body
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(MultipartPayload),
}

/// A request the transport can send, and send again.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the API prefix, e.g. `/leagues/4`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), body: RequestBody::Empty }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query.extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    /// Returns `ApiError::Config` when `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|err| ApiError::Config(format!("Failed to serialize body: {err}")))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn multipart(mut self, payload: MultipartPayload) -> Self {
        self.body = RequestBody::Multipart(payload);
        self
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self.body, RequestBody::Multipart(_))
    }

    /// Whether the method changes server state and therefore needs the
    /// anti-forgery token.
    pub fn is_state_changing(&self) -> bool {
        is_state_changing(&self.method)
    }

    /// Method actually put on the wire.
    ///
    /// Multipart bodies cannot travel with PUT/PATCH/DELETE on the backend, so
    /// when `override_enabled` they go out as POST and the intended verb rides
    /// in the `_method` field. Returns `(wire_method, overridden_method)`.
    pub fn wire_method(&self, override_enabled: bool) -> (Method, Option<Method>) {
        let overridable = matches!(self.method, Method::PUT | Method::PATCH | Method::DELETE);
        if override_enabled && self.is_multipart() && overridable {
            (Method::POST, Some(self.method.clone()))
        } else {
            (self.method.clone(), None)
        }
    }
}

pub(crate) fn is_state_changing(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH | Method::DELETE)
}
