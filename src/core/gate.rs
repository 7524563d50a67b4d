//! Duration gate: a reusable debounce primitive.
//!
//! Converts a per-frame boolean condition into a sustained-true trigger.
//! The gate arms when the condition first turns true, fires once the
//! condition has held continuously past a threshold duration, and re-arms
//! from scratch when the condition clears. The boolean test and the
//! threshold are the caller's; the gate is a pure state transition over
//! (state, input).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Result of one gate observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    /// Condition is false; timer cleared
    Idle,
    /// Condition is true but has not yet held past the threshold
    Pending,
    /// Condition has held continuously past the threshold
    Fired,
}

/// How the gate behaves once a sustained episode has crossed the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FireMode {
    /// Fire on every observation while the episode is sustained
    Repeating,
    /// Fire exactly once per episode, then report `Pending` until the
    /// condition clears and the gate re-arms
    OneShot,
}

/// Debounce gate over a caller-supplied boolean condition.
#[derive(Debug, Clone)]
pub struct DurationGate {
    threshold: Duration,
    mode: FireMode,
    active_since: Option<DateTime<Utc>>,
    fired: bool,
}

impl DurationGate {
    /// Create a repeating gate with the given sustain threshold.
    pub fn new(threshold: Duration) -> Self {
        Self::with_mode(threshold, FireMode::Repeating)
    }

    /// Create a gate with an explicit fire mode.
    pub fn with_mode(threshold: Duration, mode: FireMode) -> Self {
        Self {
            threshold,
            mode,
            active_since: None,
            fired: false,
        }
    }

    /// Observe the condition at time `now` and step the gate.
    ///
    /// The clock is caller-supplied and must be monotone non-decreasing
    /// across calls for the elapsed-time test to be meaningful.
    pub fn observe(&mut self, condition: bool, now: DateTime<Utc>) -> GateStatus {
        if !condition {
            self.active_since = None;
            self.fired = false;
            return GateStatus::Idle;
        }

        let since = *self.active_since.get_or_insert(now);
        if now - since > self.threshold {
            match self.mode {
                FireMode::Repeating => GateStatus::Fired,
                FireMode::OneShot => {
                    if self.fired {
                        GateStatus::Pending
                    } else {
                        self.fired = true;
                        GateStatus::Fired
                    }
                }
            }
        } else {
            GateStatus::Pending
        }
    }

    /// When the current episode started, if the gate is armed.
    pub fn active_since(&self) -> Option<DateTime<Utc>> {
        self.active_since
    }

    /// Clear the timer and the one-shot latch.
    pub fn reset(&mut self) {
        self.active_since = None;
        self.fired = false;
    }
}
