use tracing_subscriber::{EnvFilter, fmt};

/// Install the logging subscriber: JSON output with flattened event
/// fields, filtered by `RUST_LOG` (defaults to "info" when unset).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .json()
        .flatten_event(true)
        .init();
}
