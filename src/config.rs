//! Configuration surface.
//!
//! Five channel formulas plus the reset timeout. Formulas are arbitrary
//! arithmetic expressions over the variable vocabulary (see
//! [`crate::formula::VOCABULARY`]); exponentiation is spelled `**`.
//! Defaults are the identity formulas and a disabled reset timeout.

use crate::error::{Result, ResultExt, ShaperError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Host-facing configuration for one shaper instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaperConfig {
    /// Formula for the X output channel.
    #[serde(default = "default_x_formula")]
    pub x_formula: String,

    /// Formula for the Y output channel.
    #[serde(default = "default_y_formula")]
    pub y_formula: String,

    /// Formula for the pressure output channel.
    #[serde(default = "default_pressure_formula")]
    pub pressure_formula: String,

    /// Formula for the tilt X output channel.
    #[serde(default = "default_tilt_x_formula")]
    pub tilt_x_formula: String,

    /// Formula for the tilt Y output channel.
    #[serde(default = "default_tilt_y_formula")]
    pub tilt_y_formula: String,

    /// Inter-report gap in milliseconds after which history is discarded.
    /// Negative = never, zero = before every report.
    #[serde(default = "default_reset_time_ms")]
    pub reset_time_ms: i64,
}

fn default_x_formula() -> String {
    "x".to_string()
}

fn default_y_formula() -> String {
    "y".to_string()
}

fn default_pressure_formula() -> String {
    "p".to_string()
}

fn default_tilt_x_formula() -> String {
    "tx".to_string()
}

fn default_tilt_y_formula() -> String {
    "ty".to_string()
}

fn default_reset_time_ms() -> i64 {
    -1
}

impl Default for ShaperConfig {
    fn default() -> Self {
        Self {
            x_formula: default_x_formula(),
            y_formula: default_y_formula(),
            pressure_formula: default_pressure_formula(),
            tilt_x_formula: default_tilt_x_formula(),
            tilt_y_formula: default_tilt_y_formula(),
            reset_time_ms: default_reset_time_ms(),
        }
    }
}

impl ShaperConfig {
    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(ShaperError::from)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents).map_err(|e| {
            ShaperError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ShaperError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, json)
            .map_err(ShaperError::from)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_identity() {
        let config = ShaperConfig::default();
        assert_eq!(config.x_formula, "x");
        assert_eq!(config.y_formula, "y");
        assert_eq!(config.pressure_formula, "p");
        assert_eq!(config.tilt_x_formula, "tx");
        assert_eq!(config.tilt_y_formula, "ty");
        assert_eq!(config.reset_time_ms, -1);
    }

    #[test]
    fn test_json_round_trip() {
        let config = ShaperConfig {
            x_formula: "x * 2 + lx".into(),
            reset_time_ms: 250,
            ..ShaperConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: ShaperConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_load_error_names_the_path() {
        let err = ShaperConfig::load("/nonexistent/penshaper.json").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("/nonexistent/penshaper.json"), "{}", message);
        assert!(message.contains("IO error"), "{}", message);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let back: ShaperConfig = serde_json::from_str(r#"{"x_formula": "x / mx"}"#).unwrap();
        assert_eq!(back.x_formula, "x / mx");
        assert_eq!(back.y_formula, "y");
        assert_eq!(back.reset_time_ms, -1);
    }
}
