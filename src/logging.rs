//! Tracing subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Install a formatted subscriber on stderr.
///
/// `RUST_LOG` takes precedence; otherwise `default_level` applies to this crate.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wavemeter={}", default_level)));

    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
