//! Per-stage mutable history.
//!
//! One `StateTracker` is owned by exactly one transform stage instance and
//! mutated once per processed report. It remembers the previous raw sample
//! and the previous computed output, which formulas reach through the
//! `l*` and `c*` vocabulary slots.

use crate::report::{ComputedSample, RawSample};
use std::time::{Duration, Instant};

/// When historical state is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPolicy {
    /// History is never discarded.
    Never,
    /// Every report starts from a clean slate.
    Always,
    /// History is discarded when the inter-report gap reaches the timeout.
    After(Duration),
}

impl ResetPolicy {
    /// Build a policy from the configured timeout in milliseconds:
    /// negative = never, zero = always, positive = after that gap.
    pub fn from_millis(ms: i64) -> Self {
        if ms < 0 {
            ResetPolicy::Never
        } else if ms == 0 {
            ResetPolicy::Always
        } else {
            ResetPolicy::After(Duration::from_millis(ms as u64))
        }
    }
}

/// Mutable per-pipeline-instance memory.
#[derive(Debug, Clone)]
pub struct StateTracker {
    policy: ResetPolicy,
    last_seen: Option<Instant>,
    last_raw: RawSample,
    last_computed: ComputedSample,
}

impl StateTracker {
    /// Create a fresh tracker (zeroed history, no prior observation).
    pub fn new(policy: ResetPolicy) -> Self {
        Self {
            policy,
            last_seen: None,
            last_raw: RawSample::default(),
            last_computed: ComputedSample::default(),
        }
    }

    /// Replace the reset policy without touching history.
    pub fn set_policy(&mut self, policy: ResetPolicy) {
        self.policy = policy;
    }

    /// Apply the reset policy for a report arriving at `now` carrying `raw`.
    ///
    /// Returns whether a reset occurred. On reset the raw history restarts
    /// from the incoming sample while the computed history restarts from a
    /// neutral zero baseline, because the computed channel has no valid
    /// value to start from.
    pub fn observe(&mut self, now: Instant, raw: &RawSample) -> bool {
        let elapsed = self.last_seen.map(|t| now.duration_since(t));
        self.last_seen = Some(now);

        let reset = match self.policy {
            ResetPolicy::Never => false,
            ResetPolicy::Always => true,
            ResetPolicy::After(timeout) => elapsed.is_some_and(|gap| gap >= timeout),
        };

        if reset {
            self.last_raw = *raw;
            self.last_computed = ComputedSample::default();
        }
        reset
    }

    /// Incorporate a processed report: the raw values that were current
    /// before evaluation, and the values evaluation just produced. Called
    /// exactly once per processed report. Reports without the pen
    /// capability carry the computed history forward unchanged.
    pub fn update(&mut self, raw: RawSample, computed: Option<ComputedSample>) {
        self.last_raw = raw;
        if let Some(computed) = computed {
            self.last_computed = computed;
        }
    }

    /// The previous raw sample.
    #[inline]
    pub fn last_raw(&self) -> &RawSample {
        &self.last_raw
    }

    /// The previous computed output.
    #[inline]
    pub fn last_computed(&self) -> &ComputedSample {
        &self.last_computed
    }
}
