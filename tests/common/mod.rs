//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

use penshaper::{Extents, Notifier, Report, Severity, ShaperError};
use std::sync::Mutex;

/// Initialize tracing for test output. Safe to call from multiple tests.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Device extents used across the integration tests.
pub fn test_extents() -> Extents {
    Extents {
        max_x: 100.0,
        max_y: 100.0,
        max_pressure: 1000.0,
    }
}

/// Build a report carrying the pen capability.
pub fn pen_report(x: f64, y: f64, pressure: u32) -> Report {
    Report {
        position: Some((x, y)),
        pressure: Some(pressure),
        ..Report::default()
    }
}

/// Notifier test double that records every call.
#[derive(Default)]
pub struct RecordingNotifier {
    pub exceptions: Mutex<Vec<String>>,
    pub notifications: Mutex<Vec<(String, String, Severity)>>,
}

impl Notifier for RecordingNotifier {
    fn log_exception(&self, error: &ShaperError) {
        self.exceptions.lock().unwrap().push(error.to_string());
    }

    fn notify(&self, source: &str, message: &str, severity: Severity) {
        self.notifications
            .lock()
            .unwrap()
            .push((source.to_string(), message.to_string(), severity));
    }
}
