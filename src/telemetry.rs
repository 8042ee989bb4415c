//! `tracing` subscriber setup.

use tracing_subscriber::EnvFilter;

/// Error returned when a global subscriber is already installed.
pub type TelemetryError = Box<dyn std::error::Error + Send + Sync>;

/// Installs the global `fmt` subscriber.
///
/// The filter comes from `RUST_LOG` when set, otherwise from
/// `default_filter`; an unparsable default falls back to `info`.
///
/// # Errors
///
/// Returns [`TelemetryError`] when a global subscriber was already
/// installed.
pub fn init(default_filter: &str) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
}
