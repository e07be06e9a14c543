//! Logging/notification collaborator.
//!
//! Compilation failures are the only events surfaced through this interface;
//! the hot path never calls it. Implementations must not block or fail the
//! pipeline.

use crate::error::ShaperError;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One-way diagnostic sink for the host environment.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Record an error for developer-facing logs.
    fn log_exception(&self, error: &ShaperError);

    /// Surface a short message to the operator.
    fn notify(&self, source: &str, message: &str, severity: Severity);
}

/// Default notifier backed by `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn log_exception(&self, error: &ShaperError) {
        tracing::error!("{}", error);
    }

    fn notify(&self, source: &str, message: &str, severity: Severity) {
        match severity {
            Severity::Info => tracing::info!(source, "{}", message),
            Severity::Warning => tracing::warn!(source, "{}", message),
            Severity::Error => tracing::error!(source, "{}", message),
        }
    }
}

/// Notifier that drops everything. Useful for benchmarks and tests that do
/// not assert on diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn log_exception(&self, _error: &ShaperError) {}

    fn notify(&self, _source: &str, _message: &str, _severity: Severity) {}
}
