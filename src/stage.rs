//! Report transform stage.
//!
//! Orchestrates one report at a time: detect capabilities, apply the reset
//! policy, assemble the vocabulary values, evaluate the channel formulas in
//! fixed order (X, Y, Pressure, then TiltX, TiltY), write the results back
//! into the report, and feed the tracker. Out-of-range reports bypass all
//! of this; unrecognized reports pass through untouched.
//!
//! Reconfiguration may happen on a separate control thread. New channel
//! sets arrive as immutable `Arc` bundles over a crossbeam channel and are
//! drained at report boundaries with `try_recv`, so evaluation never takes
//! a lock and never observes a half-updated set.

use crate::channels::ChannelSet;
use crate::config::ShaperConfig;
use crate::error::{Result, ShaperError};
use crate::formula::{Channel, FormulaEngine, Slot, VOCABULARY_LEN};
use crate::notify::{Notifier, TracingNotifier};
use crate::report::{ComputedSample, ExtentsSource, RawSample, Report};
use crate::state::{ResetPolicy, StateTracker};
use crossbeam_channel::{Receiver, Sender};
use rhai::Scope;
use std::sync::Arc;
use std::time::Instant;

/// A swappable configuration snapshot sent from the control plane.
struct StageUpdate {
    channels: Arc<ChannelSet>,
    reset_policy: ResetPolicy,
}

/// Control-plane handle for reconfiguring a running stage.
///
/// Owns its own engine so compilation never touches the hot path; the
/// compiled bundle is handed over as an immutable snapshot.
pub struct ShaperHandle {
    engine: FormulaEngine,
    updates: Sender<StageUpdate>,
    notifier: Arc<dyn Notifier>,
}

impl ShaperHandle {
    /// Compile the configured formulas (with per-channel identity fallback)
    /// and install them on the stage at its next report boundary.
    pub fn reconfigure(&self, config: &ShaperConfig) -> Result<()> {
        let channels = ChannelSet::compile(&self.engine, config, self.notifier.as_ref());
        self.updates
            .send(StageUpdate {
                channels: Arc::new(channels),
                reset_policy: ResetPolicy::from_millis(config.reset_time_ms),
            })
            .map_err(|_| ShaperError::Channel("transform stage is gone".to_string()))
    }
}

/// The per-pipeline-instance transform stage.
pub struct ShaperStage<E: ExtentsSource> {
    engine: FormulaEngine,
    scope: Scope<'static>,
    channels: Arc<ChannelSet>,
    updates: Receiver<StageUpdate>,
    updates_tx: Sender<StageUpdate>,
    state: StateTracker,
    extents: E,
    notifier: Arc<dyn Notifier>,
}

impl<E: ExtentsSource> ShaperStage<E> {
    /// Create a stage from a configuration, logging diagnostics via
    /// `tracing`.
    pub fn new(config: &ShaperConfig, extents: E) -> Self {
        Self::with_notifier(config, extents, Arc::new(TracingNotifier))
    }

    /// Create a stage with an explicit notification collaborator.
    pub fn with_notifier(config: &ShaperConfig, extents: E, notifier: Arc<dyn Notifier>) -> Self {
        let engine = FormulaEngine::new();
        let channels = Arc::new(ChannelSet::compile(&engine, config, notifier.as_ref()));
        let (updates_tx, updates) = crossbeam_channel::unbounded();
        Self {
            scope: FormulaEngine::new_scope(),
            channels,
            updates,
            updates_tx,
            state: StateTracker::new(ResetPolicy::from_millis(config.reset_time_ms)),
            extents,
            notifier,
            engine,
        }
    }

    /// Create a control-plane handle for this stage. May be called more
    /// than once; each handle compiles with its own engine.
    pub fn handle(&self) -> ShaperHandle {
        ShaperHandle {
            engine: FormulaEngine::new(),
            updates: self.updates_tx.clone(),
            notifier: Arc::clone(&self.notifier),
        }
    }

    /// Recompile in place. For single-threaded hosts; threaded hosts use
    /// [`ShaperStage::handle`].
    pub fn reconfigure(&mut self, config: &ShaperConfig) {
        self.channels = Arc::new(ChannelSet::compile(
            &self.engine,
            config,
            self.notifier.as_ref(),
        ));
        self.state
            .set_policy(ResetPolicy::from_millis(config.reset_time_ms));
    }

    /// Transform one report in place. The caller forwards the report
    /// downstream unconditionally afterwards.
    pub fn transform(&mut self, report: &mut Report) {
        self.transform_at(report, Instant::now());
    }

    /// Transform one report as if it arrived at `now`. The clock is
    /// explicit so reset-timeout behavior is testable.
    pub fn transform_at(&mut self, report: &mut Report, now: Instant) {
        // Out-of-range reports are forwarded untouched and skipped
        // entirely: no swap drain, no state observation.
        if report.out_of_range {
            return;
        }

        self.drain_updates();

        // Permissive passthrough for shapes this stage does not recognize.
        if !report.has_any_capability() {
            return;
        }

        let raw = RawSample::from_report(report);
        self.state.observe(now, &raw);
        self.assemble_vocabulary(&raw);

        let computed = if report.has_pen() {
            let new_x = self.eval_channel(Channel::X, raw.x);
            let new_y = self.eval_channel(Channel::Y, raw.y);
            let new_pressure = self.eval_channel(Channel::Pressure, raw.pressure as f64);
            // Saturating float-to-int cast: NaN -> 0, negative -> 0,
            // above-range -> u32::MAX.
            let pressure_out = new_pressure as u32;

            report.position = Some((new_x, new_y));
            report.pressure = Some(pressure_out);

            // Later channels observe earlier channels' new outputs: both
            // the current and last-computed slots now hold the values
            // written to the report.
            let pressure_slot = pressure_out as f64;
            self.scope.set_value(Slot::X.name(), new_x);
            self.scope.set_value(Slot::Y.name(), new_y);
            self.scope.set_value(Slot::P.name(), pressure_slot);
            self.scope.set_value(Slot::Cx.name(), new_x);
            self.scope.set_value(Slot::Cy.name(), new_y);
            self.scope.set_value(Slot::Cp.name(), pressure_slot);

            Some(ComputedSample {
                x: new_x,
                y: new_y,
                pressure: pressure_out,
            })
        } else {
            None
        };

        if report.has_tilt() {
            let new_tilt_x = self.eval_channel(Channel::TiltX, raw.tilt_x);
            let new_tilt_y = self.eval_channel(Channel::TiltY, raw.tilt_y);
            report.tilt = Some((new_tilt_x, new_tilt_y));
        }

        self.state.update(raw, computed);
    }

    /// Access the state tracker (for hosts that surface diagnostics).
    pub fn state(&self) -> &StateTracker {
        &self.state
    }

    /// Install pending channel-set swaps. Non-blocking; runs only at report
    /// boundaries so a report sees fully-old or fully-new formulas.
    fn drain_updates(&mut self) {
        while let Ok(update) = self.updates.try_recv() {
            self.channels = update.channels;
            self.state.set_policy(update.reset_policy);
        }
    }

    /// Write the 18 vocabulary values into the evaluation scope, in
    /// vocabulary order.
    fn assemble_vocabulary(&mut self, raw: &RawSample) {
        let extents = self.extents.extents();
        let last_raw = self.state.last_raw();
        let last_computed = self.state.last_computed();

        let mut values = [0.0_f64; VOCABULARY_LEN];
        values[Slot::X.index()] = raw.x;
        values[Slot::Y.index()] = raw.y;
        values[Slot::P.index()] = raw.pressure as f64;
        values[Slot::Tx.index()] = raw.tilt_x;
        values[Slot::Ty.index()] = raw.tilt_y;
        values[Slot::D.index()] = raw.hover_distance as f64;
        values[Slot::Lx.index()] = last_raw.x;
        values[Slot::Ly.index()] = last_raw.y;
        values[Slot::Lp.index()] = last_raw.pressure as f64;
        values[Slot::Ltx.index()] = last_raw.tilt_x;
        values[Slot::Lty.index()] = last_raw.tilt_y;
        values[Slot::Ld.index()] = last_raw.hover_distance as f64;
        values[Slot::Mx.index()] = extents.max_x;
        values[Slot::My.index()] = extents.max_y;
        values[Slot::Mp.index()] = extents.max_pressure;
        values[Slot::Cx.index()] = last_computed.x;
        values[Slot::Cy.index()] = last_computed.y;
        values[Slot::Cp.index()] = last_computed.pressure as f64;

        FormulaEngine::bind(&mut self.scope, &values);
    }

    /// Evaluate one channel, passing the raw input through unchanged if the
    /// engine reports an error (operation limit); the hot path never fails.
    fn eval_channel(&mut self, channel: Channel, passthrough: f64) -> f64 {
        match self.engine.eval(self.channels.get(channel), &mut self.scope) {
            Ok(value) => value,
            Err(error) => {
                tracing::trace!("{} evaluation error: {}", channel.name(), error);
                passthrough
            }
        }
    }
}

impl<E: ExtentsSource + std::fmt::Debug> std::fmt::Debug for ShaperStage<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaperStage")
            .field("channels", &self.channels)
            .field("state", &self.state)
            .field("extents", &self.extents)
            .finish()
    }
}
