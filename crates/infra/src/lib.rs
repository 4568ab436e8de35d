//! # Pitwall Infrastructure
//!
//! The API communication layer of the Pitwall dashboards.
//!
//! This crate contains:
//! - The cookie-carrying HTTP transport and its middleware pipeline
//! - Anti-forgery token handling (credential stage, 419 recovery)
//! - The 401 redirect to the login surface
//! - Cancellation scopes tied to a consumer's lifetime
//! - Envelope unwrapping, failure classification and resource services
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements and consumes the host ports defined in `pitwall-core`
//! - Depends on `pitwall-domain` for payloads and configuration
//! - Contains all "impure" code (network I/O, environment, files)

pub mod api;
pub mod cancellation;
pub mod config;
pub mod csrf;
pub mod errors;
pub mod host;
pub mod http;
pub mod interceptors;
pub mod observability;
pub mod services;

// Re-export commonly used items
pub use api::{ApiClient, ApiError, ClassifiedError, FieldErrors};
pub use cancellation::{CancelScope, CancellationToken, KeyedCancelScope};
pub use csrf::CsrfTokenStore;
pub use host::{InMemorySession, LocationState};
pub use http::{ApiRequest, HttpClient, MultipartPayload};
pub use services::{DriverService, LeagueService, UserService};
