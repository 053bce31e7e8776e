//! Logger setup shared by every Tagarela binary.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence. Without it, `bin_name` (with dashes turned into
/// underscores, as in crate targets) and the library crates log at `default_level`,
/// and `tower_http` logs at `debug`.
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let target = bin_name.replace('-', "_");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{target}={default_level},tagarela_server={default_level},tower_http=debug"
        ))
    });

    // try_init: integration tests may start several servers in one process
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(filter)
        .try_init();
}
