//! Cookie-carrying HTTP transport and its middleware pipeline

pub mod client;
pub mod pipeline;
pub mod request;

pub use client::{HttpClient, HttpClientBuilder};
pub use pipeline::{FailureStage, Pipeline, RequestStage};
pub use request::{ApiRequest, FilePart, MultipartPayload, RequestBody};
