//! Per-window sampling loop.

use std::collections::BTreeMap;

use rand::Rng;
use serde::Serialize;

use crate::error::Result;
use crate::events::{EventKind, EventLog};
use crate::ledger::TopicLedger;
use crate::pool::{TopicId, TopicPool};
use crate::regime::{ExhaustionResponse, RegimeController};

/// One sampled document together with the topic it was drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sample<D> {
    pub topic: TopicId,
    pub document: D,
}

/// One time step of the synthetic stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Window<D> {
    /// Zero-based position in the stream.
    pub index: usize,
    pub samples: Vec<Sample<D>>,
    /// Ground-truth label: the window was generated under a regime change.
    pub regime_changing: bool,
    /// Active topic count when sampling of the window began.
    pub active_topics: usize,
}

impl<D> Window<D> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn documents(&self) -> impl Iterator<Item = &D> {
        self.samples.iter().map(|s| &s.document)
    }

    /// Documents per topic, in topic-id order.
    #[must_use]
    pub fn topic_counts(&self) -> BTreeMap<TopicId, usize> {
        let mut counts = BTreeMap::new();
        for s in &self.samples {
            *counts.entry(s.topic).or_insert(0) += 1;
        }
        counts
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSampler {
    window_size: usize,
    min_topics: usize,
}

impl WindowSampler {
    #[must_use]
    pub const fn new(window_size: usize, min_topics: usize) -> Self {
        Self {
            window_size,
            min_topics,
        }
    }

    #[must_use]
    pub const fn window_size(&self) -> usize {
        self.window_size
    }

    #[must_use]
    pub const fn min_topics(&self) -> usize {
        self.min_topics
    }

    /// Sample one window of up to `window_size` documents.
    ///
    /// A slot is filled by drawing from the chosen topic. When the topic is
    /// empty, the regime decides: `Redistribute` retires it and
    /// `AbortRegimeChange` ends the drift, both without using up the slot;
    /// `DeferRemoval` spends the slot without a document. Sampling stops early
    /// once fewer than `min_topics` topics remain active.
    pub fn generate_window<D, C, R>(
        &self,
        index: usize,
        pool: &mut TopicPool<D>,
        ledger: &mut TopicLedger,
        regime: &mut C,
        rng: &mut R,
        events: &mut EventLog,
    ) -> Result<Window<D>>
    where
        C: RegimeController,
        R: Rng + ?Sized,
    {
        let regime_changing = regime.is_changing();
        let active_topics = ledger.active_len();
        let mut samples = Vec::with_capacity(self.window_size);
        let mut slots = 0;

        while slots < self.window_size {
            if ledger.active_len() < self.min_topics {
                break;
            }
            let Some(topic) = regime.sample_topic(ledger, rng) else {
                break;
            };
            if pool.remaining(topic)? > 0 {
                let document = pool.draw(topic, rng)?;
                samples.push(Sample { topic, document });
                slots += 1;
                continue;
            }
            match regime.on_exhausted(topic, events) {
                ExhaustionResponse::Redistribute => {
                    ledger.retire(topic)?;
                    events.push(EventKind::TopicRetired { topic });
                }
                ExhaustionResponse::AbortRegimeChange => {
                    events.push(EventKind::DriftAborted { topic });
                    regime.abort_regime_change(ledger, events)?;
                }
                ExhaustionResponse::DeferRemoval => slots += 1,
            }
        }

        Ok(Window {
            index,
            samples,
            regime_changing,
            active_topics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DriftParams, ShiftParams};
    use crate::pool::TopicDocuments;
    use crate::regime::{AbruptShift, GradualDrift};
    use crate::simplex::ProbabilitySimplex;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pool(sizes: &[usize]) -> TopicPool<(usize, usize)> {
        TopicPool::new(
            sizes
                .iter()
                .enumerate()
                .map(|(t, n)| TopicDocuments::new(format!("t{t}"), (0..*n).map(|d| (t, d)).collect()))
                .collect(),
        )
    }

    fn ledger(active: &[usize], reserve: &[usize]) -> TopicLedger {
        TopicLedger::new(
            ProbabilitySimplex::uniform(active.iter().copied().map(TopicId).collect()),
            reserve.iter().copied().map(TopicId).collect(),
        )
    }

    fn quiet_shift() -> AbruptShift {
        AbruptShift::new(ShiftParams { shift_prob: 0.0 })
    }

    #[test]
    fn full_window_when_documents_suffice() {
        let mut p = pool(&[50, 50, 50]);
        let mut l = ledger(&[0, 1, 2], &[]);
        let mut regime = quiet_shift();
        let mut rng = StdRng::seed_from_u64(1);
        let mut events = EventLog::default();
        let w = WindowSampler::new(20, 2)
            .generate_window(0, &mut p, &mut l, &mut regime, &mut rng, &mut events)
            .unwrap();
        assert_eq!(w.len(), 20);
        assert_eq!(w.active_topics, 3);
        assert!(!w.regime_changing);
        assert_eq!(p.total_remaining(), 130);
        for s in &w.samples {
            assert_eq!(s.document.0, s.topic.index());
        }
        assert_eq!(w.topic_counts().values().sum::<usize>(), 20);
    }

    #[test]
    fn exhausted_topic_is_retired_without_losing_the_slot() {
        let mut p = pool(&[0, 30, 30]);
        let mut l = ledger(&[0, 1, 2], &[]);
        let mut regime = quiet_shift();
        let mut rng = StdRng::seed_from_u64(2);
        let mut events = EventLog::default();
        let w = WindowSampler::new(10, 1)
            .generate_window(0, &mut p, &mut l, &mut regime, &mut rng, &mut events)
            .unwrap();
        assert_eq!(w.len(), 10);
        assert!(w.samples.iter().all(|s| s.topic != TopicId(0)));
        // Topic 0 is only retired if it was picked at least once.
        if l.retired().contains(&TopicId(0)) {
            assert_eq!(l.active_len(), 2);
            assert!(events
                .events()
                .iter()
                .any(|e| e.kind == EventKind::TopicRetired { topic: TopicId(0) }));
        }
        assert!(l.is_partition_of(3));
        assert!(l.active().is_consistent());
    }

    #[test]
    fn stops_early_below_min_topics() {
        let mut p = pool(&[3, 3]);
        let mut l = ledger(&[0, 1], &[]);
        let mut regime = quiet_shift();
        let mut rng = StdRng::seed_from_u64(3);
        let mut events = EventLog::default();
        let w = WindowSampler::new(100, 2)
            .generate_window(0, &mut p, &mut l, &mut regime, &mut rng, &mut events)
            .unwrap();
        assert!(w.len() >= 3 && w.len() <= 6, "got {} documents", w.len());
        assert_eq!(l.active_len(), 1);
    }

    #[test]
    fn last_topic_can_drain_completely() {
        let mut p = pool(&[4]);
        let mut l = ledger(&[0], &[]);
        let mut regime = quiet_shift();
        let mut rng = StdRng::seed_from_u64(4);
        let mut events = EventLog::default();
        let w = WindowSampler::new(10, 1)
            .generate_window(0, &mut p, &mut l, &mut regime, &mut rng, &mut events)
            .unwrap();
        assert_eq!(w.len(), 4);
        assert!(l.active().is_empty());
        assert_eq!(l.retired(), &[TopicId(0)]);
    }

    #[test]
    fn deferred_topic_under_fills_the_window() {
        let mut p = pool(&[0, 500, 500, 500]);
        let mut l = ledger(&[0, 1, 2], &[3]);
        let mut regime = GradualDrift::new(DriftParams {
            drift_prob: 1.0,
            decrease_windows: 5,
            increase_windows: 10,
        });
        let mut rng = StdRng::seed_from_u64(0);
        let mut events = EventLog::default();
        regime.before_window(&mut l, &mut rng, &mut events).unwrap();
        let state = regime.state().clone();
        // Exhausting the decrease topic would abort the drift instead.
        assert_ne!(state.decrease_topic, Some(TopicId(0)));
        assert_eq!(state.increase_topic, Some(TopicId(3)));
        let w = WindowSampler::new(200, 2)
            .generate_window(1, &mut p, &mut l, &mut regime, &mut rng, &mut events)
            .unwrap();
        assert!(w.regime_changing);
        assert!(w.len() < 200, "topic 0 holds mass, so some slots stay empty");
        assert!(regime.state().pending_exhausted.contains(&TopicId(0)));
        assert!(l.active().contains(TopicId(0)));
    }

    #[test]
    fn exhausted_drift_topic_aborts_the_drift() {
        let mut p = pool(&[2000, 2000, 2000, 0]);
        let mut l = ledger(&[0, 1, 2], &[3]);
        let mut regime = GradualDrift::new(DriftParams {
            drift_prob: 1.0,
            decrease_windows: 5,
            increase_windows: 10,
        });
        let mut rng = StdRng::seed_from_u64(6);
        let mut events = EventLog::default();
        regime.before_window(&mut l, &mut rng, &mut events).unwrap();
        assert_eq!(regime.state().increase_topic, Some(TopicId(3)));
        let w = WindowSampler::new(1000, 2)
            .generate_window(1, &mut p, &mut l, &mut regime, &mut rng, &mut events)
            .unwrap();
        assert_eq!(w.len(), 1000);
        assert!(w.regime_changing);
        assert!(!regime.is_changing(), "drift must have been aborted");
        assert!(events
            .events()
            .iter()
            .any(|e| e.kind == EventKind::DriftAborted { topic: TopicId(3) }));
        // Once stable again, the empty topic is retired on its next pick.
        assert!(l.retired().contains(&TopicId(3)));
        assert!(l.is_partition_of(4));
    }
}
