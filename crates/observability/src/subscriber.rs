//! JSON subscriber setup.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset: service logs at info, SQL statement
/// logging from sqlx kept to warnings.
pub const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Install the global subscriber: one JSON object per event, with the
/// enclosing span's fields attached. Later calls leave the first one in place.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .with_current_span(true)
        .try_init();
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
