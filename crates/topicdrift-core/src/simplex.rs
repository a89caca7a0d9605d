//! Probability simplex over the active topics.
//!
//! The active set is stored as two parallel vectors: topic ids in activation
//! order and their probability mass. Every mutation except
//! [`ProbabilitySimplex::renormalize_subset`] preserves the total mass, and
//! [`ProbabilitySimplex::sample`] renormalizes before every draw so rounding
//! error from repeated incremental updates never skews the distribution.
//!
//! ## Ramp rule
//!
//! ```text
//! delta      = (target - p[i]) / windows_remaining
//! p[i]      += delta
//! p[j]      -= delta / (n - 1)      for j != i, floored at 0
//! ```
//!
//! A share that an entry cannot cover without going negative is taken evenly
//! from the entries that still hold mass. Applied once per window with
//! `windows_remaining` counting down to 1, the ramped entry lands exactly on
//! `target` on the final call.

use std::num::NonZeroUsize;

use rand::Rng;

use crate::error::{EngineError, Result};
use crate::pool::TopicId;

/// Tolerance used for the unit-mass invariant.
pub const MASS_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilitySimplex {
    topics: Vec<TopicId>,
    mass: Vec<f64>,
}

impl ProbabilitySimplex {
    /// Equal mass on every topic.
    #[must_use]
    pub fn uniform(topics: Vec<TopicId>) -> Self {
        let n = topics.len();
        let share = if n == 0 { 0.0 } else { 1.0 / n as f64 };
        Self {
            mass: vec![share; n],
            topics,
        }
    }

    /// A draw from the flat Dirichlet distribution, via normalized Exp(1) variates.
    #[must_use]
    pub fn dirichlet<R: Rng + ?Sized>(topics: Vec<TopicId>, rng: &mut R) -> Self {
        // 1 - U lies in (0, 1], so the logarithm stays finite.
        let mass: Vec<f64> = topics
            .iter()
            .map(|_| -(1.0 - rng.gen_range(0.0..1.0_f64)).ln())
            .collect();
        let mut simplex = Self { topics, mass };
        simplex.renormalize();
        simplex
    }

    /// Build from explicit parts. Lengths must match and ids must be distinct.
    pub fn from_parts(topics: Vec<TopicId>, mass: Vec<f64>) -> Result<Self> {
        if topics.len() != mass.len() {
            return Err(EngineError::InvalidRegimeParameters(format!(
                "{} topics but {} probabilities",
                topics.len(),
                mass.len()
            )));
        }
        for (i, t) in topics.iter().enumerate() {
            if topics[..i].contains(t) {
                return Err(EngineError::DuplicateTopic(*t));
            }
        }
        if mass.iter().any(|m| !m.is_finite() || *m < 0.0) {
            return Err(EngineError::InvalidRegimeParameters(
                "probabilities must be finite and non-negative".to_string(),
            ));
        }
        Ok(Self { topics, mass })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    #[must_use]
    pub fn topics(&self) -> &[TopicId] {
        &self.topics
    }

    #[must_use]
    pub fn masses(&self) -> &[f64] {
        &self.mass
    }

    #[must_use]
    pub fn contains(&self, topic: TopicId) -> bool {
        self.topics.contains(&topic)
    }

    #[must_use]
    pub fn position(&self, topic: TopicId) -> Option<usize> {
        self.topics.iter().position(|t| *t == topic)
    }

    #[must_use]
    pub fn mass_of(&self, topic: TopicId) -> Option<f64> {
        self.position(topic).map(|i| self.mass[i])
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.mass.iter().sum()
    }

    /// Arithmetic mean of the probability vector (0 when empty).
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.mass.is_empty() {
            0.0
        } else {
            self.total() / self.mass.len() as f64
        }
    }

    /// Rescale to unit mass; an all-zero vector becomes uniform.
    pub fn renormalize(&mut self) {
        let total = self.total();
        if total > 0.0 && total.is_finite() {
            for m in &mut self.mass {
                *m /= total;
            }
        } else if !self.mass.is_empty() {
            let share = 1.0 / self.mass.len() as f64;
            self.mass.fill(share);
        }
    }

    /// Reset every entry to `1 / n`.
    pub fn reset_uniform(&mut self) {
        if !self.mass.is_empty() {
            let share = 1.0 / self.mass.len() as f64;
            self.mass.fill(share);
        }
    }

    /// Categorical draw according to the current weights.
    ///
    /// Renormalizes first, so accumulated ramp error never biases the draw.
    pub fn sample<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<TopicId> {
        if self.topics.is_empty() {
            return None;
        }
        self.renormalize();
        let u = rng.gen_range(0.0..1.0_f64);
        let mut acc = 0.0;
        for (topic, mass) in self.topics.iter().zip(&self.mass) {
            acc += mass;
            if u < acc {
                return Some(*topic);
            }
        }
        // Rounding left `acc` just under 1: take the last topic with any mass.
        self.topics
            .iter()
            .zip(&self.mass)
            .rev()
            .find(|(_, m)| **m > 0.0)
            .map(|(t, _)| *t)
    }

    /// Uniform draw over the active topics, ignoring weights.
    pub fn sample_uniform<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<TopicId> {
        if self.topics.is_empty() {
            None
        } else {
            Some(self.topics[rng.gen_range(0..self.topics.len())])
        }
    }

    /// Add `topic` at the end of the active set with `mass`.
    pub fn append(&mut self, topic: TopicId, mass: f64) -> Result<()> {
        if self.contains(topic) {
            return Err(EngineError::DuplicateTopic(topic));
        }
        self.topics.push(topic);
        self.mass.push(mass.max(0.0));
        Ok(())
    }

    /// Remove `topic` and spread its mass evenly over the remaining entries.
    ///
    /// Returns the removed mass.
    pub fn remove_and_redistribute(&mut self, topic: TopicId) -> Result<f64> {
        let idx = self
            .position(topic)
            .ok_or(EngineError::InactiveTopic(topic))?;
        if self.topics.len() == 1 {
            return Err(EngineError::EmptyAfterRemoval(topic));
        }
        self.topics.remove(idx);
        let removed = self.mass.remove(idx);
        let share = removed / self.mass.len() as f64;
        for m in &mut self.mass {
            *m += share;
        }
        Ok(removed)
    }

    /// Remove `topic` without redistributing its mass.
    ///
    /// Only meaningful for the final active topic, where there is nothing to
    /// redistribute to.
    pub fn evict(&mut self, topic: TopicId) -> Result<f64> {
        let idx = self
            .position(topic)
            .ok_or(EngineError::InactiveTopic(topic))?;
        self.topics.remove(idx);
        Ok(self.mass.remove(idx))
    }

    /// Drop every topic for which `keep` is false and rescale the rest to 1.
    ///
    /// Returns the dropped topics in their former order.
    pub fn renormalize_subset<F>(&mut self, mut keep: F) -> Result<Vec<TopicId>>
    where
        F: FnMut(TopicId) -> bool,
    {
        let mut kept_topics = Vec::with_capacity(self.topics.len());
        let mut kept_mass = Vec::with_capacity(self.mass.len());
        let mut dropped = Vec::new();
        for (topic, mass) in self.topics.iter().zip(&self.mass) {
            if keep(*topic) {
                kept_topics.push(*topic);
                kept_mass.push(*mass);
            } else {
                dropped.push(*topic);
            }
        }
        if kept_topics.is_empty() {
            if let Some(first) = dropped.first() {
                return Err(EngineError::EmptyAfterRemoval(*first));
            }
            return Ok(dropped);
        }
        self.topics = kept_topics;
        self.mass = kept_mass;
        self.renormalize();
        Ok(dropped)
    }

    /// Move `topic` one linear step toward `target`, compensating on the others.
    pub fn ramp_toward(
        &mut self,
        topic: TopicId,
        target: f64,
        windows_remaining: NonZeroUsize,
    ) -> Result<()> {
        let idx = self
            .position(topic)
            .ok_or(EngineError::InactiveTopic(topic))?;
        let n = self.mass.len();
        let delta = (target - self.mass[idx]) / windows_remaining.get() as f64;
        self.mass[idx] = (self.mass[idx] + delta).max(0.0);
        if n == 1 {
            return Ok(());
        }
        if delta >= 0.0 {
            self.take_evenly(idx, delta);
        } else {
            let share = -delta / (n - 1) as f64;
            for (j, m) in self.mass.iter_mut().enumerate() {
                if j != idx {
                    *m += share;
                }
            }
        }
        Ok(())
    }

    /// Remove `amount` from every entry but `skip`, evenly, never below zero.
    fn take_evenly(&mut self, skip: usize, mut amount: f64) {
        // Each pass either covers the rest of `amount` or empties an entry.
        for _ in 0..self.mass.len() {
            let donors = self
                .mass
                .iter()
                .enumerate()
                .filter(|(j, m)| *j != skip && **m > 0.0)
                .count();
            if donors == 0 || amount <= 0.0 {
                return;
            }
            let share = amount / donors as f64;
            for (j, m) in self.mass.iter_mut().enumerate() {
                if j != skip && *m > 0.0 {
                    let taken = share.min(*m);
                    *m -= taken;
                    amount -= taken;
                }
            }
        }
    }

    /// True when lengths agree, ids are distinct, entries are non-negative and
    /// the total is within [`MASS_TOLERANCE`] of 1.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        if self.topics.len() != self.mass.len() {
            return false;
        }
        let distinct = self
            .topics
            .iter()
            .enumerate()
            .all(|(i, t)| !self.topics[..i].contains(t));
        let non_negative = self.mass.iter().all(|m| *m >= 0.0);
        let unit = self.topics.is_empty() || (self.total() - 1.0).abs() <= MASS_TOLERANCE;
        distinct && non_negative && unit
    }
}
