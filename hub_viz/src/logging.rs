//! Process-wide logging setup

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Install a `tracing` subscriber writing to stderr, filtered by `RUST_LOG`
/// (default `info`). Call once at process start; later calls are no-ops.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice() {
        init();
        init();
        tracing::info!("logging initialised");
    }
}
