//! Topic ledger: which topics are active, held in reserve, or retired.
//!
//! Every topic id of the pool lives in exactly one of the three sets. Active
//! topics carry probability mass through the [`ProbabilitySimplex`]; reserve
//! topics can be activated again; retired topics ran out of documents and are
//! never sampled again.

use crate::error::{EngineError, Result};
use crate::pool::TopicId;
use crate::simplex::ProbabilitySimplex;

#[derive(Debug, Clone, PartialEq)]
pub struct TopicLedger {
    active: ProbabilitySimplex,
    reserve: Vec<TopicId>,
    retired: Vec<TopicId>,
}

impl TopicLedger {
    #[must_use]
    pub fn new(active: ProbabilitySimplex, reserve: Vec<TopicId>) -> Self {
        Self {
            active,
            reserve,
            retired: Vec::new(),
        }
    }

    #[must_use]
    pub fn active(&self) -> &ProbabilitySimplex {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut ProbabilitySimplex {
        &mut self.active
    }

    #[must_use]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn reserve(&self) -> &[TopicId] {
        &self.reserve
    }

    #[must_use]
    pub fn retired(&self) -> &[TopicId] {
        &self.retired
    }

    /// Remove `topic` from the active set, redistributing its mass.
    ///
    /// The final active topic is evicted outright since no topic is left to
    /// take its mass; the run is terminal afterwards.
    fn take_active(&mut self, topic: TopicId) -> Result<()> {
        if self.active.len() == 1 && self.active.contains(topic) {
            self.active.evict(topic)?;
        } else {
            self.active.remove_and_redistribute(topic)?;
        }
        Ok(())
    }

    /// Move an active topic back to the reserve pool.
    pub fn deactivate(&mut self, topic: TopicId) -> Result<()> {
        self.take_active(topic)?;
        self.reserve.push(topic);
        Ok(())
    }

    /// Permanently retire an active topic that ran out of documents.
    pub fn retire(&mut self, topic: TopicId) -> Result<()> {
        self.take_active(topic)?;
        self.retired.push(topic);
        Ok(())
    }

    /// Record topics already dropped from the simplex as retired.
    pub fn mark_retired(&mut self, topics: &[TopicId]) {
        self.retired.extend_from_slice(topics);
    }

    /// Take the reserve topic at `slot` out of the reserve pool.
    pub fn take_reserve(&mut self, slot: usize) -> Option<TopicId> {
        (slot < self.reserve.len()).then(|| self.reserve.remove(slot))
    }

    /// Activate the reserve topic at `slot` with `mass`.
    pub fn activate_reserve(&mut self, slot: usize, mass: f64) -> Result<TopicId> {
        let topic = self.take_reserve(slot).ok_or_else(|| {
            EngineError::InvalidRegimeParameters(format!("reserve slot {slot} is empty"))
        })?;
        self.active.append(topic, mass)?;
        Ok(topic)
    }

    /// Checks the partition invariant against a pool of `topic_count` topics.
    #[must_use]
    pub fn is_partition_of(&self, topic_count: usize) -> bool {
        let mut seen = vec![false; topic_count];
        let all = self
            .active
            .topics()
            .iter()
            .chain(&self.reserve)
            .chain(&self.retired);
        for topic in all {
            match seen.get_mut(topic.index()) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        seen.into_iter().all(|s| s)
    }
}
