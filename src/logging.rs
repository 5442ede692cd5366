use tracing_subscriber::EnvFilter;

/// Setup logging of request and resolution events.
///
/// The RUST_LOG environment variable overrides `default_level`, e.g.
/// `RUST_LOG=sinkhole::resolver=trace` to follow every delegation.
pub fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .ok();
}
