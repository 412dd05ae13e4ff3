//! Tracing subscriber setup for the `hifz` binary.
//!
//! Output goes to stderr so stdout stays free for match events. `RUST_LOG`
//! overrides the caller's default filter and `RUST_LOG_FORMAT=json` switches
//! to JSON lines.

use tracing_subscriber::EnvFilter;

/// Engine transitions at info, window rebuilds hidden.
pub const DEFAULT_FILTER: &str = "hifz=info";
/// Adds per-utterance scoring and window rebuilds.
pub const VERBOSE_FILTER: &str = "hifz=debug";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Reads `RUST_LOG_FORMAT`.
    pub fn from_env() -> Self {
        Self::parse(std::env::var("RUST_LOG_FORMAT").ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// `RUST_LOG` when set and valid, otherwise `default_filter`.
pub fn filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(default_filter: &str, format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(default_filter))
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.compact().try_init(),
    };
}
