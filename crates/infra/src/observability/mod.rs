//! Tracing setup
//!
//! Installs a `tracing-subscriber` formatter filtered by `RUST_LOG`
//! (default `info`). Safe to call more than once: later calls are no-ops.
//!
//! Anti-forgery token values are never recorded by this crate; only their
//! source (cache, page meta, cookie) appears in events.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// `json` selects JSON output; anything else the human-readable format.
    pub fn from_env_value(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed.
pub fn init_tracing(format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_current_span(true)).try_init(),
    };

    installed.is_ok()
}

/// Install the global subscriber, picking the format from `PITWALL_LOG_FORMAT`.
pub fn init_tracing_from_env() -> bool {
    let format = std::env::var("PITWALL_LOG_FORMAT")
        .map(|value| LogFormat::from_env_value(&value))
        .unwrap_or_default();
    init_tracing(format)
}
