//! Logging abstractions for runtime-agnostic logging
//!
//! Core components take a `SharedLogger` at construction time instead of
//! logging through a global, so tests can run silent and hosts decide where
//! output goes.

mod traits;
mod noop;
mod tracing_logger;

pub use traits::{Logger, SharedLogger};
pub use noop::NoOpLogger;
pub use tracing_logger::TracingLogger;
