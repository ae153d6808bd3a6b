//! Logger implementation backed by `tracing`

use super::traits::Logger;

/// Forwards core log lines to `tracing` events
///
/// Events are emitted under the `toolrelay` target so an `EnvFilter` such as
/// `toolrelay=debug` controls core verbosity independently of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "toolrelay", "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "toolrelay", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "toolrelay", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "toolrelay", "{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::logging::SharedLogger;

    #[test]
    fn test_tracing_logger_without_subscriber() {
        // No subscriber installed: events are dropped without panicking
        let logger: SharedLogger = Arc::new(TracingLogger::new());
        logger.debug("debug message");
        logger.info("info message");
        logger.warn("warn message");
        logger.error("error message");
    }
}
