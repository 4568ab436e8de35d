//! In-process implementations of the host ports
//!
//! Used by shells that have no browser underneath (CLI tools, native
//! front-ends, tests): navigation is recorded and broadcast instead of
//! loading a page, and session state lives in memory.

pub mod location;
pub mod session;

pub use location::LocationState;
pub use session::InMemorySession;
