//! # penshaper: formula-driven report shaping
//!
//! A real-time signal-shaping stage for pointing-device input pipelines.
//! Each output channel (X, Y, Pressure, TiltX, TiltY) is defined by a
//! user-supplied arithmetic formula over a fixed vocabulary of 18 named
//! variables: the current raw sample, the previous raw sample, the previous
//! computed output, and the device maxima. Formulas are compiled once at
//! configuration time and evaluated on every report.
//!
//! ## Architecture
//!
//! - **Formula engine**: Rhai expression compilation and evaluation, with
//!   probe validation so unknown identifiers fail at configuration time
//! - **Channel set**: the five compiled formulas as one immutable bundle,
//!   swapped atomically on reconfiguration
//! - **State tracker**: per-instance history with a reset-timeout policy
//! - **Transform stage**: per-report orchestration on a lock-free hot path
//! - **Communication**: crossbeam channel for control-plane swaps
//!
//! ## Example
//!
//! ```
//! use penshaper::{Extents, Report, ShaperConfig, ShaperStage};
//!
//! let config = ShaperConfig {
//!     // soften pressure onset; ** is exponentiation
//!     pressure_formula: "mp * (p / mp) ** 2".to_string(),
//!     ..ShaperConfig::default()
//! };
//!
//! let extents = Extents {
//!     max_x: 152.0,
//!     max_y: 95.0,
//!     max_pressure: 8192.0,
//! };
//! let mut stage = ShaperStage::new(&config, extents);
//!
//! let mut report = Report {
//!     position: Some((76.0, 40.0)),
//!     pressure: Some(4096),
//!     ..Report::default()
//! };
//! stage.transform(&mut report);
//! assert_eq!(report.pressure, Some(2048));
//! ```

pub mod channels;
pub mod config;
pub mod error;
pub mod formula;
pub mod notify;
pub mod report;
pub mod stage;
pub mod state;

// Re-export commonly used types
pub use channels::ChannelSet;
pub use config::ShaperConfig;
pub use error::{Result, ShaperError};
pub use formula::{Channel, CompiledFormula, FormulaEngine, VOCABULARY};
pub use notify::{Notifier, Severity, TracingNotifier};
pub use report::{ComputedSample, Extents, ExtentsSource, RawSample, Report};
pub use stage::{ShaperHandle, ShaperStage};
pub use state::{ResetPolicy, StateTracker};
