//! Gradual drift: one topic fades out while a new one fades in.
//!
//! State machine:
//!
//! ```text
//!            u < drift_prob, reserve non-empty
//!   Stable ─────────────────────────────────────▶ Drifting
//!     ▲                                             │
//!     │   counter == increase_windows, or a drift   │
//!     └──────── topic ran out of documents ─────────┘
//! ```
//!
//! While drifting, each `before_window` call ramps the increase topic toward
//! its target (the mean mass at drift start) and, until `decrease_windows`
//! calls have passed, ramps the decrease topic toward zero. At
//! `counter == decrease_windows` the decrease topic goes back to the reserve.
//! Topics that run dry mid-drift keep their stale mass and are dropped in bulk
//! when the drift ends.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;

use rand::Rng;

use crate::config::{DriftParams, RegimePolicy};
use crate::error::Result;
use crate::events::{EventKind, EventLog};
use crate::ledger::TopicLedger;
use crate::pool::TopicId;
use crate::regime::{ExhaustionResponse, RegimeController};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriftPhase {
    Stable,
    Drifting,
}

/// Bookkeeping for the drift in progress.
///
/// While stable, both drift topics are `None` and `counter` is 0.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DriftState {
    pub counter: usize,
    pub increase_topic: Option<TopicId>,
    pub decrease_topic: Option<TopicId>,
    pub increase_target: f64,
    pub pending_exhausted: BTreeSet<TopicId>,
}

impl DriftState {
    #[must_use]
    pub fn is_drifting(&self) -> bool {
        self.increase_topic.is_some()
    }

    fn involves(&self, topic: TopicId) -> bool {
        self.increase_topic == Some(topic) || self.decrease_topic == Some(topic)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradualDrift {
    params: DriftParams,
    state: DriftState,
    drifts_started: usize,
}

impl GradualDrift {
    #[must_use]
    pub fn new(params: DriftParams) -> Self {
        Self {
            params,
            state: DriftState::default(),
            drifts_started: 0,
        }
    }

    #[must_use]
    pub fn params(&self) -> DriftParams {
        self.params
    }

    #[must_use]
    pub fn state(&self) -> &DriftState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> DriftPhase {
        if self.state.is_drifting() {
            DriftPhase::Drifting
        } else {
            DriftPhase::Stable
        }
    }

    #[must_use]
    pub fn drifts_started(&self) -> usize {
        self.drifts_started
    }

    fn start<R: Rng + ?Sized>(
        &mut self,
        ledger: &mut TopicLedger,
        rng: &mut R,
        events: &mut EventLog,
    ) -> Result<()> {
        let Some(decrease) = ledger.active().sample_uniform(rng) else {
            return Ok(());
        };
        let slot = rng.gen_range(0..ledger.reserve().len());
        let target = ledger.active().mean();
        let increase = ledger.activate_reserve(slot, 0.0)?;

        self.state = DriftState {
            counter: 0,
            increase_topic: Some(increase),
            decrease_topic: Some(decrease),
            increase_target: target,
            pending_exhausted: BTreeSet::new(),
        };
        self.drifts_started += 1;
        events.push(EventKind::DriftStarted {
            increase,
            decrease,
            target,
        });
        Ok(())
    }

    fn advance(&mut self, ledger: &mut TopicLedger, events: &mut EventLog) -> Result<()> {
        let DriftParams {
            decrease_windows,
            increase_windows,
            ..
        } = self.params;
        let (Some(increase), Some(decrease)) =
            (self.state.increase_topic, self.state.decrease_topic)
        else {
            return Ok(());
        };
        let counter = self.state.counter;

        if counter >= increase_windows {
            return self.finish(ledger, events);
        }
        if counter == decrease_windows {
            ledger.deactivate(decrease)?;
            self.state.pending_exhausted.remove(&decrease);
            events.push(EventKind::DecreaseTopicRemoved { topic: decrease });
        }
        if let Some(remaining) = NonZeroUsize::new(increase_windows - counter) {
            let target = self.state.increase_target;
            ledger
                .active_mut()
                .ramp_toward(increase, target, remaining)?;
        }
        if counter < decrease_windows
            && let Some(remaining) = NonZeroUsize::new(decrease_windows - counter)
        {
            ledger.active_mut().ramp_toward(decrease, 0.0, remaining)?;
        }
        self.state.counter += 1;
        Ok(())
    }

    /// Return to Stable, retiring every topic that ran dry during the drift.
    fn finish(&mut self, ledger: &mut TopicLedger, events: &mut EventLog) -> Result<()> {
        let pending = std::mem::take(&mut self.state.pending_exhausted);
        if pending.is_empty() {
            ledger.active_mut().renormalize();
        } else {
            let dropped = ledger
                .active_mut()
                .renormalize_subset(|t| !pending.contains(&t))?;
            ledger.mark_retired(&dropped);
            events.push(EventKind::PendingRetired { topics: dropped });
        }
        self.state = DriftState::default();
        events.push(EventKind::DriftEnded);
        Ok(())
    }
}

impl RegimeController for GradualDrift {
    fn policy(&self) -> RegimePolicy {
        RegimePolicy::Drift
    }

    fn before_window<R: Rng + ?Sized>(
        &mut self,
        ledger: &mut TopicLedger,
        rng: &mut R,
        events: &mut EventLog,
    ) -> Result<()> {
        if !self.state.is_drifting()
            && !ledger.reserve().is_empty()
            && rng.gen_range(0.0..1.0) < self.params.drift_prob
        {
            self.start(ledger, rng, events)?;
        }
        if self.state.is_drifting() {
            self.advance(ledger, events)?;
        }
        Ok(())
    }

    fn on_exhausted(&mut self, topic: TopicId, events: &mut EventLog) -> ExhaustionResponse {
        if !self.state.is_drifting() {
            return ExhaustionResponse::Redistribute;
        }
        if self.state.involves(topic) {
            return ExhaustionResponse::AbortRegimeChange;
        }
        if self.state.pending_exhausted.insert(topic) {
            events.push(EventKind::TopicDeferred { topic });
        }
        ExhaustionResponse::DeferRemoval
    }

    fn abort_regime_change(
        &mut self,
        ledger: &mut TopicLedger,
        events: &mut EventLog,
    ) -> Result<()> {
        if self.state.is_drifting() {
            self.finish(ledger, events)?;
        }
        Ok(())
    }

    fn is_changing(&self) -> bool {
        self.state.is_drifting()
    }
}
