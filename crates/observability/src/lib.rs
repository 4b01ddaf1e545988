//! Logging setup shared by binaries and tests.

/// Initialize process-wide logging from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init_with(&tracing::ObservabilityConfig::from_env());
}

/// Subscriber configuration and installation.
pub mod tracing;

pub use self::tracing::{ObservabilityConfig, init_with};
