//! Logging setup for the bridge binaries.

mod subscriber;

pub use subscriber::{init_subscriber, TelemetryConfig};
