//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt};

/// Install a stderr `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks `debug` over `info`.
/// Calling this twice is harmless, the second install is ignored.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
