//! Process-wide logging for the API binary and tests.
//!
//! One JSON `tracing-subscriber` installed on first `init()`; the level filter
//! comes from `RUST_LOG`.

pub mod subscriber;

pub use subscriber::{DEFAULT_FILTER, init};
