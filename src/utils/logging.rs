use std::env;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging for the standalone tooling.
///
/// The library itself only emits `tracing` events; when the core runs
/// embedded in a host integration layer, that layer owns the subscriber.
pub fn init_logging() {
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = EnvFilter::new(&log_level);
        filter = filter.add_directive("avatar_swap=debug".parse().unwrap());
        filter
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();

    tracing::info!("Logging initialized with level: {}", log_level);
}
