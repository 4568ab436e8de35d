//! # Pitwall Core
//!
//! Port interfaces between the API client and its host page.
//!
//! The client runs inside an application shell (a browser page, a webview, a
//! test harness) that owns navigation, the page-embedded anti-forgery token
//! and the client-side session state. This crate describes those
//! collaborators as traits so the infrastructure crate never reaches for an
//! ambient global.
//!
//! ## Architecture Principles
//! - Only depends on `pitwall-domain`
//! - No HTTP or platform code
//! - All external collaborators via traits

// Host ports
pub mod csrf_ports;
pub mod navigation_ports;
pub mod session_ports;

pub use csrf_ports::PageTokenSource;
pub use navigation_ports::Navigator;
pub use session_ports::SessionStore;
