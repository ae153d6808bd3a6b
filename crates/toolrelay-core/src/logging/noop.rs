//! No-op logger implementation

use std::sync::Arc;

use super::traits::{Logger, SharedLogger};

/// A logger that does nothing
///
/// Used by tests and by embedders that do not want core output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl NoOpLogger {
    /// Create a new no-op logger
    pub fn new() -> Self {
        Self
    }

    /// A shared handle, ready to pass to core constructors
    pub fn shared() -> SharedLogger {
        Arc::new(Self)
    }
}

impl Logger for NoOpLogger {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}
