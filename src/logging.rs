//! Logging setup shared by the binaries.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Send log messages to stderr.
///
/// The `RUST_LOG` environment variable takes precedence over
/// `default_level`. If neither is a valid filter, "info" is used.
///
/// Does nothing if a global subscriber has already been set.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_log = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    if let Err(error) = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_log)
        .try_init()
    {
        eprintln!("Could not set up logging: {error}");
    }
}
