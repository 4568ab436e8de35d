//! Wire-level constants
//!
//! Centralized location for the status codes and header names the backend
//! contract is built on.

// Sentinel status codes
pub const STATUS_UNAUTHENTICATED: u16 = 401;
pub const STATUS_TOKEN_MISMATCH: u16 = 419; // Laravel "page expired"
pub const STATUS_VALIDATION_FAILED: u16 = 422;

// Anti-forgery headers (both are checked by the backend, values must match)
pub const CSRF_HEADER: &str = "X-CSRF-TOKEN";
pub const XSRF_HEADER: &str = "X-XSRF-TOKEN";
pub const XSRF_COOKIE: &str = "XSRF-TOKEN";

// Multipart method override
pub const METHOD_OVERRIDE_FIELD: &str = "_method";

// Defaults
pub const DEFAULT_API_PREFIX: &str = "/api";
pub const DEFAULT_CSRF_REFRESH_PATH: &str = "/sanctum/csrf-cookie";
pub const DEFAULT_USER_LOGIN_PATH: &str = "/login";
pub const DEFAULT_ADMIN_LOGIN_PATH: &str = "/admin/login";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PER_PAGE: u32 = 15;

// User-facing fallback messages
pub const GENERIC_UNKNOWN_MESSAGE: &str = "An unexpected error occurred";
