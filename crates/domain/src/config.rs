//! Client configuration structures

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ADMIN_LOGIN_PATH, DEFAULT_API_PREFIX, DEFAULT_CSRF_REFRESH_PATH, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_LOGIN_PATH,
};
use crate::errors::{PitwallError, Result};

/// Which dashboard a client instance serves.
///
/// Each surface gets its own client instance and its own login route; they
/// share the backend origin and the API prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppSurface {
    Admin,
    User,
}

impl AppSurface {
    /// Login route for this surface.
    pub fn login_path<'a>(&self, config: &'a ClientConfig) -> &'a str {
        match self {
            Self::Admin => &config.admin_login_path,
            Self::User => &config.user_login_path,
        }
    }

    /// Stable label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

/// Configuration for the API client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend origin (scheme, host, port), e.g. `https://league.example.com`
    pub origin: String,
    /// Path prefix every API route lives under
    pub api_prefix: String,
    /// Route that (re)issues the anti-forgery cookie; relative to `origin`
    pub csrf_refresh_path: String,
    /// Login route of the user dashboard
    pub user_login_path: String,
    /// Login route of the admin dashboard
    pub admin_login_path: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    /// Send multipart PUT/PATCH/DELETE as POST with a `_method` field
    pub multipart_method_override: bool,
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8000".to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            csrf_refresh_path: DEFAULT_CSRF_REFRESH_PATH.to_string(),
            user_login_path: DEFAULT_USER_LOGIN_PATH.to_string(),
            admin_login_path: DEFAULT_ADMIN_LOGIN_PATH.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            multipart_method_override: true,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at `origin` with every other field defaulted.
    pub fn with_origin(origin: impl Into<String>) -> Self {
        Self { origin: origin.into(), ..Self::default() }
    }

    /// Check structural invariants that do not need URL parsing.
    ///
    /// # Errors
    /// Returns `PitwallError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.origin.trim().is_empty() {
            return Err(PitwallError::Config("origin must not be empty".into()));
        }
        if self.timeout_seconds == 0 {
            return Err(PitwallError::Config("timeout_seconds must be positive".into()));
        }

        let paths = [
            ("api_prefix", &self.api_prefix),
            ("csrf_refresh_path", &self.csrf_refresh_path),
            ("user_login_path", &self.user_login_path),
            ("admin_login_path", &self.admin_login_path),
        ];
        for (field, value) in paths {
            if !value.starts_with('/') {
                return Err(PitwallError::Config(format!("{field} must start with '/'")));
            }
        }

        Ok(())
    }
}
