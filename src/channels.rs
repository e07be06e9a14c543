//! The five-channel compiled bundle.
//!
//! A `ChannelSet` is built as a whole and never mutated: reconfiguration
//! compiles a fresh set and swaps it in behind an `Arc`, so an in-flight
//! evaluation sees either the fully-old or the fully-new set. Each channel
//! compiles independently; a failure substitutes that channel's identity
//! fallback and is surfaced through the notifier without aborting the other
//! four.

use crate::config::ShaperConfig;
use crate::formula::{Channel, CompiledFormula, FormulaEngine};
use crate::notify::{Notifier, Severity};

/// Diagnostic source name reported through the notifier.
const NOTIFY_SOURCE: &str = "penshaper";

/// An immutable bundle of the five compiled channel formulas.
#[derive(Debug, Clone)]
pub struct ChannelSet {
    x: CompiledFormula,
    y: CompiledFormula,
    pressure: CompiledFormula,
    tilt_x: CompiledFormula,
    tilt_y: CompiledFormula,
}

impl ChannelSet {
    /// Compile a full set from configured formulas.
    ///
    /// Infallible: a channel whose formula does not compile falls back to
    /// its identity formula, and the failure is reported through the
    /// notifier.
    pub fn compile(engine: &FormulaEngine, config: &ShaperConfig, notifier: &dyn Notifier) -> Self {
        Self {
            x: Self::compile_channel(engine, Channel::X, &config.x_formula, notifier),
            y: Self::compile_channel(engine, Channel::Y, &config.y_formula, notifier),
            pressure: Self::compile_channel(
                engine,
                Channel::Pressure,
                &config.pressure_formula,
                notifier,
            ),
            tilt_x: Self::compile_channel(engine, Channel::TiltX, &config.tilt_x_formula, notifier),
            tilt_y: Self::compile_channel(engine, Channel::TiltY, &config.tilt_y_formula, notifier),
        }
    }

    /// Compile the all-identity set (the configuration default).
    pub fn identity(engine: &FormulaEngine) -> Self {
        let compile = |channel: Channel| {
            engine
                .compile(channel, channel.identity_formula())
                .expect("identity formula compiles")
        };
        Self {
            x: compile(Channel::X),
            y: compile(Channel::Y),
            pressure: compile(Channel::Pressure),
            tilt_x: compile(Channel::TiltX),
            tilt_y: compile(Channel::TiltY),
        }
    }

    fn compile_channel(
        engine: &FormulaEngine,
        channel: Channel,
        source: &str,
        notifier: &dyn Notifier,
    ) -> CompiledFormula {
        match engine.compile(channel, source) {
            Ok(formula) => formula,
            Err(error) => {
                notifier.log_exception(&error);
                notifier.notify(
                    NOTIFY_SOURCE,
                    &format!(
                        "{} formula '{}' failed to compile, using '{}'",
                        channel.name(),
                        source,
                        channel.identity_formula()
                    ),
                    Severity::Warning,
                );
                engine
                    .compile(channel, channel.identity_formula())
                    .expect("identity formula compiles")
            }
        }
    }

    /// Get the compiled formula for a channel.
    #[inline]
    pub fn get(&self, channel: Channel) -> &CompiledFormula {
        match channel {
            Channel::X => &self.x,
            Channel::Y => &self.y,
            Channel::Pressure => &self.pressure,
            Channel::TiltX => &self.tilt_x,
            Channel::TiltY => &self.tilt_y,
        }
    }
}
