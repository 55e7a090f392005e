//! Tracing subscriber setup.
//!
//! The engine emits structured `tracing` events; embedding tools and test
//! binaries call [`try_init`] once to get them on stderr. Filtering follows
//! the standard `RUST_LOG` convention.

use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber if none is installed yet.
///
/// Safe to call from every test; only the first call wins.
pub fn try_init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
