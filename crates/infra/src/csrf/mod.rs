//! Anti-forgery token handling

pub mod store;

pub use store::{CsrfTokenStore, TokenSource};
