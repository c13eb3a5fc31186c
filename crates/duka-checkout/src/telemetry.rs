//! # Telemetry
//!
//! Tracing subscriber setup for binaries embedding the checkout engine.
//! Library code only emits events; installing a subscriber is the host
//! application's call, which is why this lives in its own module instead
//! of running implicitly.

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber.
///
/// ## Filter Control
///
/// The `RUST_LOG` environment variable overrides the default filter:
/// - `RUST_LOG=debug` - Debug messages from everything
/// - `RUST_LOG=duka_checkout=trace` - Trace the engine only
/// - Default: INFO, with debug for the duka crates
///
/// Panics if a global subscriber is already installed, so call it once at
/// startup.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,duka_core=debug,duka_checkout=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
