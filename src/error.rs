//! Error handling for penshaper
//!
//! This module defines the crate error type and a Result alias. Errors only
//! occur at the configuration boundary (formula compilation, config I/O,
//! control-plane sends); the per-report hot path is infallible once a
//! channel set is installed.

use thiserror::Error;

/// Main error type for penshaper operations
#[derive(Error, Debug)]
pub enum ShaperError {
    /// A channel formula failed to parse or validate
    #[error("Formula error: {0}")]
    Formula(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to control-channel communication
    #[error("Channel error: {0}")]
    Channel(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ShaperError>,
    },
}

impl ShaperError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ShaperError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a formula error from a Rhai parse error
    pub fn from_parse_error(err: rhai::ParseError) -> Self {
        ShaperError::Formula(err.to_string())
    }

    /// Create a formula error from a Rhai evaluation error
    pub fn from_eval_error(err: Box<rhai::EvalAltResult>) -> Self {
        ShaperError::Formula(err.to_string())
    }
}

/// Result type alias for penshaper operations
pub type Result<T> = std::result::Result<T, ShaperError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
