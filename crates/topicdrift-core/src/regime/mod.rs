//! Regime-change policies.
//!
//! A [`RegimeController`] is consulted at two points of every step:
//!
//! 1. while a window is sampled, whenever the chosen topic has no documents
//!    left ([`RegimeController::on_exhausted`]);
//! 2. after the window is complete, to prepare the active set for the next
//!    one ([`RegimeController::before_window`]).
//!
//! Two strategies exist: [`AbruptShift`] and [`GradualDrift`]. The engine
//! holds them through the closed [`Regime`] enum.

pub mod drift;
pub mod shift;

use rand::Rng;
use serde::Serialize;

use crate::config::{RegimeParams, RegimePolicy};
use crate::error::Result;
use crate::events::EventLog;
use crate::ledger::TopicLedger;
use crate::pool::TopicId;

pub use drift::{DriftPhase, DriftState, GradualDrift};
pub use shift::AbruptShift;

/// How the sampler should treat a topic found without documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ExhaustionResponse {
    /// Retire the topic now and spread its mass over the other active topics.
    Redistribute,
    /// Leave the topic in place; it is removed in bulk when the drift ends.
    DeferRemoval,
    /// The running regime change is no longer feasible; end it immediately.
    AbortRegimeChange,
}

pub trait RegimeController {
    fn policy(&self) -> RegimePolicy;

    /// Possibly alter the active set before the next window is sampled.
    fn before_window<R: Rng + ?Sized>(
        &mut self,
        ledger: &mut TopicLedger,
        rng: &mut R,
        events: &mut EventLog,
    ) -> Result<()>;

    /// Decide what happens to an active topic that has run dry.
    fn on_exhausted(&mut self, topic: TopicId, events: &mut EventLog) -> ExhaustionResponse;

    /// Force-end the running regime change after an `AbortRegimeChange`.
    fn abort_regime_change(
        &mut self,
        ledger: &mut TopicLedger,
        events: &mut EventLog,
    ) -> Result<()>;

    /// Pick the topic for the next draw.
    fn sample_topic<R: Rng + ?Sized>(
        &self,
        ledger: &mut TopicLedger,
        rng: &mut R,
    ) -> Option<TopicId> {
        ledger.active_mut().sample(rng)
    }

    /// Whether the upcoming window is generated under a regime change.
    fn is_changing(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Regime {
    Shift(AbruptShift),
    Drift(GradualDrift),
}

impl Regime {
    #[must_use]
    pub fn from_params(params: &RegimeParams) -> Self {
        match params {
            RegimeParams::Shift(p) => Self::Shift(AbruptShift::new(*p)),
            RegimeParams::Drift(p) => Self::Drift(GradualDrift::new(*p)),
        }
    }

    #[must_use]
    pub fn as_drift(&self) -> Option<&GradualDrift> {
        match self {
            Self::Drift(d) => Some(d),
            Self::Shift(_) => None,
        }
    }

    #[must_use]
    pub fn as_shift(&self) -> Option<&AbruptShift> {
        match self {
            Self::Shift(s) => Some(s),
            Self::Drift(_) => None,
        }
    }
}

impl RegimeController for Regime {
    fn policy(&self) -> RegimePolicy {
        match self {
            Self::Shift(s) => s.policy(),
            Self::Drift(d) => d.policy(),
        }
    }

    fn before_window<R: Rng + ?Sized>(
        &mut self,
        ledger: &mut TopicLedger,
        rng: &mut R,
        events: &mut EventLog,
    ) -> Result<()> {
        match self {
            Self::Shift(s) => s.before_window(ledger, rng, events),
            Self::Drift(d) => d.before_window(ledger, rng, events),
        }
    }

    fn on_exhausted(&mut self, topic: TopicId, events: &mut EventLog) -> ExhaustionResponse {
        match self {
            Self::Shift(s) => s.on_exhausted(topic, events),
            Self::Drift(d) => d.on_exhausted(topic, events),
        }
    }

    fn abort_regime_change(
        &mut self,
        ledger: &mut TopicLedger,
        events: &mut EventLog,
    ) -> Result<()> {
        match self {
            Self::Shift(s) => s.abort_regime_change(ledger, events),
            Self::Drift(d) => d.abort_regime_change(ledger, events),
        }
    }

    fn sample_topic<R: Rng + ?Sized>(
        &self,
        ledger: &mut TopicLedger,
        rng: &mut R,
    ) -> Option<TopicId> {
        match self {
            Self::Shift(s) => s.sample_topic(ledger, rng),
            Self::Drift(d) => d.sample_topic(ledger, rng),
        }
    }

    fn is_changing(&self) -> bool {
        match self {
            Self::Shift(s) => s.is_changing(),
            Self::Drift(d) => d.is_changing(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DriftParams, ShiftParams};

    #[test]
    fn regime_follows_params() {
        let shift = Regime::from_params(&RegimeParams::Shift(ShiftParams::default()));
        assert_eq!(shift.policy(), RegimePolicy::Shift);
        assert!(shift.as_shift().is_some());
        assert!(shift.as_drift().is_none());

        let drift = Regime::from_params(&RegimeParams::Drift(DriftParams::default()));
        assert_eq!(drift.policy(), RegimePolicy::Drift);
        assert!(drift.as_drift().is_some());
        assert!(!drift.is_changing());
    }
}
