//! Tracing subscriber wiring.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber: JSON lines with timestamps, filtered via
/// `RUST_LOG` with `info` as the default level.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    init_with_default("info");
}

/// Same as [`init`], with an explicit fallback filter for when `RUST_LOG`
/// is absent or malformed.
pub fn init_with_default(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
