//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

pub const FILTER_ENV: &str = "RUST_LOG";
pub const FORMAT_ENV: &str = "MONOGRAM_LOG_FORMAT";

const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directives, e.g. `monogram_sales=debug,info`.
    pub filter: String,
    /// JSON lines when true, human-readable output otherwise.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            json: true,
        }
    }
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `MONOGRAM_LOG_FORMAT=pretty` switches off JSON; any other value keeps it.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let filter = lookup(FILTER_ENV)
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());

        let json = !lookup(FORMAT_ENV)
            .is_some_and(|format| format.trim().eq_ignore_ascii_case("pretty"));

        Self { filter, json }
    }
}

/// Install the global subscriber described by `config`.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_with(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    // Already-installed subscriber is not an error.
    let _ = if config.json {
        builder.json().try_init()
    } else {
        builder.pretty().try_init()
    };
}
