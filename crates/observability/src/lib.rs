//! Process-wide observability setup.
//!
//! The domain and storage crates only emit `tracing` spans and events; this
//! crate owns the subscriber wiring so binaries and test harnesses install
//! it with one call.

pub mod tracing;

/// Initialize observability for the process.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    tracing::init();
}
