//! Result type definition and logging combinators.
//!
//! Poll ticks and best-effort teardown must never propagate failures; these
//! combinators turn a `Result` into an `Option` while leaving a log line behind.

use crate::error::Error;

/// The standard Result type for fleetview operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for swallowing errors at a logging boundary.
pub trait ResultExt<T> {
    /// Convert to an Option, logging the error at `warn` level.
    fn warn_on_err(self, context: &str) -> Option<T>;

    /// Convert to an Option, logging the error at `error` level.
    fn error_on_err(self, context: &str) -> Option<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn warn_on_err(self, context: &str) -> Option<T> {
        self.map_err(|e| tracing::warn!(error = %e, "{context}")).ok()
    }

    fn error_on_err(self, context: &str) -> Option<T> {
        self.map_err(|e| tracing::error!(error = %e, "{context}")).ok()
    }
}
