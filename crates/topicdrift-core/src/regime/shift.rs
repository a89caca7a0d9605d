//! Abrupt shift: whole topics appear or disappear between windows.
//!
//! Before each window a uniform draw below `shift_prob` triggers a shift; a
//! fair coin then picks between dropping a random active topic (back to the
//! reserve) and activating a random reserve topic. Sampling is uniform over
//! the active set, so the simplex is kept flat after every membership change.

use rand::Rng;

use crate::config::{RegimePolicy, ShiftParams};
use crate::error::Result;
use crate::events::{EventKind, EventLog};
use crate::ledger::TopicLedger;
use crate::pool::TopicId;
use crate::regime::{ExhaustionResponse, RegimeController};

#[derive(Debug, Clone, PartialEq)]
pub struct AbruptShift {
    params: ShiftParams,
    /// The last `before_window` call altered the active set.
    shifted: bool,
    shifts: usize,
}

impl AbruptShift {
    #[must_use]
    pub fn new(params: ShiftParams) -> Self {
        Self {
            params,
            shifted: false,
            shifts: 0,
        }
    }

    #[must_use]
    pub fn params(&self) -> ShiftParams {
        self.params
    }

    /// Number of shifts that altered the active set so far.
    #[must_use]
    pub fn shifts(&self) -> usize {
        self.shifts
    }

    fn drop_active<R: Rng + ?Sized>(
        &mut self,
        ledger: &mut TopicLedger,
        rng: &mut R,
        events: &mut EventLog,
    ) -> Result<()> {
        let Some(topic) = ledger.active().sample_uniform(rng) else {
            return Ok(());
        };
        ledger.deactivate(topic)?;
        ledger.active_mut().reset_uniform();
        events.push(EventKind::ShiftDeactivated { topic });
        self.shifted = true;
        Ok(())
    }

    fn add_reserve<R: Rng + ?Sized>(
        &mut self,
        ledger: &mut TopicLedger,
        rng: &mut R,
        events: &mut EventLog,
    ) -> Result<()> {
        if ledger.reserve().is_empty() {
            events.push(EventKind::ShiftSkipped);
            return Ok(());
        }
        let slot = rng.gen_range(0..ledger.reserve().len());
        let topic = ledger.activate_reserve(slot, 0.0)?;
        ledger.active_mut().reset_uniform();
        events.push(EventKind::ShiftActivated { topic });
        self.shifted = true;
        Ok(())
    }
}

impl RegimeController for AbruptShift {
    fn policy(&self) -> RegimePolicy {
        RegimePolicy::Shift
    }

    fn before_window<R: Rng + ?Sized>(
        &mut self,
        ledger: &mut TopicLedger,
        rng: &mut R,
        events: &mut EventLog,
    ) -> Result<()> {
        self.shifted = false;
        if rng.gen_range(0.0..1.0) >= self.params.shift_prob {
            return Ok(());
        }
        if rng.gen_bool(0.5) {
            self.drop_active(ledger, rng, events)?;
        } else {
            self.add_reserve(ledger, rng, events)?;
        }
        if self.shifted {
            self.shifts += 1;
        }
        Ok(())
    }

    fn on_exhausted(&mut self, _topic: TopicId, _events: &mut EventLog) -> ExhaustionResponse {
        ExhaustionResponse::Redistribute
    }

    fn abort_regime_change(
        &mut self,
        _ledger: &mut TopicLedger,
        _events: &mut EventLog,
    ) -> Result<()> {
        Ok(())
    }

    fn sample_topic<R: Rng + ?Sized>(
        &self,
        ledger: &mut TopicLedger,
        rng: &mut R,
    ) -> Option<TopicId> {
        ledger.active().sample_uniform(rng)
    }

    fn is_changing(&self) -> bool {
        self.shifted
    }
}
