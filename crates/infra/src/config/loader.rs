//! Configuration loader
//!
//! Loads the client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the origin is not set there, falls back to loading from file
//! 3. Searches multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `PITWALL_API_ORIGIN`: Backend origin (required for env loading)
//! - `PITWALL_API_PREFIX`: Path prefix of API routes
//! - `PITWALL_CSRF_REFRESH_PATH`: Route that reissues the anti-forgery cookie
//! - `PITWALL_LOGIN_PATH`: Login route of the user dashboard
//! - `PITWALL_ADMIN_LOGIN_PATH`: Login route of the admin dashboard
//! - `PITWALL_HTTP_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `PITWALL_METHOD_OVERRIDE`: Multipart method override (true/false)
//! - `PITWALL_USER_AGENT`: User agent sent with every request
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./pitwall.json` or `./pitwall.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names in the parent and grandparent directories
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use pitwall_domain::{ClientConfig, PitwallError, Result};

use crate::http::client::parse_origin;

const FILE_NAMES: [&str; 4] = ["pitwall.json", "pitwall.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the origin is not
/// set there, falls back to a config file.
///
/// # Errors
/// Returns `PitwallError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The resulting configuration fails validation
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `PITWALL_API_ORIGIN` is required; every other variable falls back
/// to its default.
///
/// # Errors
/// Returns `PitwallError::Config` if the origin is missing or a value is
/// invalid.
pub fn load_from_env() -> Result<ClientConfig> {
    let defaults = ClientConfig::default();

    let timeout_seconds = match std::env::var("PITWALL_HTTP_TIMEOUT_SECS") {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| PitwallError::Config(format!("Invalid HTTP timeout: {}", e)))?,
        Err(_) => defaults.timeout_seconds,
    };

    let config = ClientConfig {
        origin: env_var("PITWALL_API_ORIGIN")?,
        api_prefix: env_or("PITWALL_API_PREFIX", defaults.api_prefix),
        csrf_refresh_path: env_or("PITWALL_CSRF_REFRESH_PATH", defaults.csrf_refresh_path),
        user_login_path: env_or("PITWALL_LOGIN_PATH", defaults.user_login_path),
        admin_login_path: env_or("PITWALL_ADMIN_LOGIN_PATH", defaults.admin_login_path),
        timeout_seconds,
        multipart_method_override: env_bool(
            "PITWALL_METHOD_OVERRIDE",
            defaults.multipart_method_override,
        ),
        user_agent: std::env::var("PITWALL_USER_AGENT").ok(),
    };

    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`find_config_path`].
///
/// # Errors
/// Returns `PitwallError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The configuration fails validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PitwallError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_path().ok_or_else(|| {
            PitwallError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PitwallError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    validate(&config)?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `PitwallError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PitwallError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PitwallError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(PitwallError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Structural checks plus a real URL parse of the origin.
fn validate(config: &ClientConfig) -> Result<()> {
    config.validate()?;
    parse_origin(&config.origin)?;
    Ok(())
}

/// Search multiple paths for configuration files
///
/// Searches for config files in the following locations (in order):
/// 1. Current working directory and up to two parents
/// 2. Executable directory and up to two parents
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_path() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    candidates(&roots).into_iter().find(|path| path.exists())
}

fn candidates(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    for root in roots {
        for dir in [root.clone(), root.join(".."), root.join("../..")] {
            candidates.extend(FILE_NAMES.iter().map(|name| dir.join(name)));
        }
    }
    candidates
}

/// Get required environment variable
///
/// # Errors
/// Returns `PitwallError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        PitwallError::Config(format!("Missing required environment variable: {}", key))
    })
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty()).unwrap_or(default)
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
///
/// # Returns
/// The parsed boolean value, or `default` if not set.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
