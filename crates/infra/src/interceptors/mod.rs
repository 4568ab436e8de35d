//! Transport middleware
//!
//! Declared order matters: the credential stage runs on every attempt, the
//! session-fault stage is consulted before the auth-redirect stage, and only
//! one failure stage handles any given response.

pub mod auth_redirect;
pub mod credential;
pub mod session_fault;

pub use auth_redirect::AuthRedirectStage;
pub use credential::CredentialStage;
pub use session_fault::SessionFaultStage;
