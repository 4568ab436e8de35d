//! # Pitwall Domain
//!
//! Payload types and configuration shared by the Pitwall API client.
//!
//! This crate contains:
//! - Resource payloads (leagues, drivers, user profiles)
//! - The normalized pagination shape handed to paging UIs
//! - Client configuration structures
//! - Domain error types and Result definitions
//! - Wire-level constants (sentinel status codes, header names)
//!
//! ## Architecture
//! - No dependencies on other Pitwall crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
