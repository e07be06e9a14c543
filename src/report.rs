//! Report model for the transform hot path.
//!
//! A `Report` is the shared representation at the stream boundary. Reports
//! are capability-tagged, not hierarchical: a single report may carry any
//! combination of position+pressure, tilt, and hover-distance data, and
//! capability checks are field-presence checks. A distinguished out-of-range
//! marker bypasses all processing.

/// A single device report flowing through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Report {
    /// Absolute position on the sensing surface.
    pub position: Option<(f64, f64)>,
    /// Contact pressure.
    pub pressure: Option<u32>,
    /// Pen tilt along both axes.
    pub tilt: Option<(f64, f64)>,
    /// Pen distance from the sensing surface, independent of contact.
    pub hover_distance: Option<u32>,
    /// Out-of-range marker: forwarded untouched, never processed.
    pub out_of_range: bool,
}

impl Report {
    /// Create an empty report (no capabilities).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an out-of-range marker report.
    pub fn out_of_range() -> Self {
        Self {
            out_of_range: true,
            ..Self::default()
        }
    }

    /// Whether this report carries position and pressure data.
    #[inline]
    pub fn has_pen(&self) -> bool {
        self.position.is_some() && self.pressure.is_some()
    }

    /// Whether this report carries tilt data.
    #[inline]
    pub fn has_tilt(&self) -> bool {
        self.tilt.is_some()
    }

    /// Whether this report carries hover-distance data.
    #[inline]
    pub fn has_proximity(&self) -> bool {
        self.hover_distance.is_some()
    }

    /// Whether any capability is present at all.
    #[inline]
    pub fn has_any_capability(&self) -> bool {
        self.has_pen() || self.has_tilt() || self.has_proximity()
    }
}

/// Snapshot of the raw fields of one report, zero-filled for absent
/// capabilities. This is exactly what the variable assembly sees, so the
/// state tracker's history matches what formulas observed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawSample {
    pub x: f64,
    pub y: f64,
    pub pressure: u32,
    pub tilt_x: f64,
    pub tilt_y: f64,
    pub hover_distance: u32,
}

impl RawSample {
    /// Extract the raw sample from a report, zero-filling absent fields.
    pub fn from_report(report: &Report) -> Self {
        let (x, y) = report.position.unwrap_or((0.0, 0.0));
        let (tilt_x, tilt_y) = report.tilt.unwrap_or((0.0, 0.0));
        Self {
            x,
            y,
            pressure: report.pressure.unwrap_or(0),
            tilt_x,
            tilt_y,
            hover_distance: report.hover_distance.unwrap_or(0),
        }
    }
}

/// The values a report's pen channels evaluated to.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComputedSample {
    pub x: f64,
    pub y: f64,
    pub pressure: u32,
}

/// Device maxima supplied by the capability collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Extents {
    pub max_x: f64,
    pub max_y: f64,
    pub max_pressure: f64,
}

/// Read-only device-capability collaborator, consulted once per processed
/// report.
pub trait ExtentsSource {
    fn extents(&self) -> Extents;
}

impl ExtentsSource for Extents {
    fn extents(&self) -> Extents {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_checks() {
        let mut report = Report::new();
        assert!(!report.has_any_capability());

        report.position = Some((10.0, 20.0));
        // Position without pressure is not the pen capability
        assert!(!report.has_pen());

        report.pressure = Some(500);
        assert!(report.has_pen());
        assert!(!report.has_tilt());

        report.tilt = Some((0.5, -0.5));
        assert!(report.has_tilt());
    }

    #[test]
    fn test_out_of_range_marker() {
        let report = Report::out_of_range();
        assert!(report.out_of_range);
        assert!(!report.has_any_capability());
    }

    #[test]
    fn test_raw_sample_zero_fills_absent_fields() {
        let report = Report {
            tilt: Some((1.5, -2.5)),
            ..Report::default()
        };
        let raw = RawSample::from_report(&report);
        assert_eq!(raw.x, 0.0);
        assert_eq!(raw.y, 0.0);
        assert_eq!(raw.pressure, 0);
        assert_eq!(raw.tilt_x, 1.5);
        assert_eq!(raw.tilt_y, -2.5);
        assert_eq!(raw.hover_distance, 0);
    }

    #[test]
    fn test_extents_self_source() {
        let extents = Extents {
            max_x: 100.0,
            max_y: 100.0,
            max_pressure: 1000.0,
        };
        assert_eq!(extents.extents(), extents);
    }
}
