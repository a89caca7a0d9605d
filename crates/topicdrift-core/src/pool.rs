//! Topic pool: per-topic document multisets drawn without replacement.

use std::fmt;

use rand::Rng;
use serde::Serialize;

use crate::error::{EngineError, Result};

/// Dense topic identifier (position in the topic source's enumeration order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TopicId(pub usize);

impl TopicId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One topic as handed over by the topic source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicDocuments<D> {
    pub name: String,
    pub documents: Vec<D>,
}

impl<D> TopicDocuments<D> {
    #[must_use]
    pub fn new(name: impl Into<String>, documents: Vec<D>) -> Self {
        Self {
            name: name.into(),
            documents,
        }
    }
}

/// Supplies the topics a simulation starts from.
///
/// Document handles are opaque to the engine: they are only counted, moved
/// into windows and handed back to the caller.
pub trait TopicSource {
    type Document;

    /// Consume the source, yielding topics in their enumeration order.
    fn into_topics(self) -> Vec<TopicDocuments<Self::Document>>;
}

impl<D> TopicSource for Vec<TopicDocuments<D>> {
    type Document = D;

    fn into_topics(self) -> Vec<TopicDocuments<D>> {
        self
    }
}

#[derive(Debug, Clone)]
struct TopicSlot<D> {
    name: String,
    initial: usize,
    remaining: Vec<D>,
}

/// Owns the remaining documents of every topic.
///
/// Topics are never removed from the pool; only their documents are.
#[derive(Debug, Clone)]
pub struct TopicPool<D> {
    topics: Vec<TopicSlot<D>>,
}

impl<D> TopicPool<D> {
    #[must_use]
    pub fn new(topics: Vec<TopicDocuments<D>>) -> Self {
        Self {
            topics: topics
                .into_iter()
                .map(|t| TopicSlot {
                    name: t.name,
                    initial: t.documents.len(),
                    remaining: t.documents,
                })
                .collect(),
        }
    }

    /// Number of topics (active, reserve and retired alike).
    #[must_use]
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// All topic ids in enumeration order.
    pub fn ids(&self) -> impl Iterator<Item = TopicId> + '_ {
        (0..self.topics.len()).map(TopicId)
    }

    fn slot(&self, topic: TopicId) -> Result<&TopicSlot<D>> {
        self.topics
            .get(topic.index())
            .ok_or(EngineError::UnknownTopic(topic))
    }

    pub fn name(&self, topic: TopicId) -> Result<&str> {
        self.slot(topic).map(|s| s.name.as_str())
    }

    /// Topic names indexed by `TopicId`.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.topics.iter().map(|s| s.name.clone()).collect()
    }

    pub fn remaining(&self, topic: TopicId) -> Result<usize> {
        self.slot(topic).map(|s| s.remaining.len())
    }

    pub fn initial(&self, topic: TopicId) -> Result<usize> {
        self.slot(topic).map(|s| s.initial)
    }

    #[must_use]
    pub fn total_remaining(&self) -> usize {
        self.topics.iter().map(|s| s.remaining.len()).sum()
    }

    /// Remove and return one uniformly chosen remaining document of `topic`.
    ///
    /// Callers check [`remaining`](Self::remaining) first; drawing from an
    /// empty topic is a precondition violation reported as `ExhaustedTopic`.
    pub fn draw<R: Rng + ?Sized>(&mut self, topic: TopicId, rng: &mut R) -> Result<D> {
        let slot = self
            .topics
            .get_mut(topic.index())
            .ok_or(EngineError::UnknownTopic(topic))?;
        if slot.remaining.is_empty() {
            return Err(EngineError::ExhaustedTopic(topic));
        }
        let idx = rng.gen_range(0..slot.remaining.len());
        Ok(slot.remaining.swap_remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pool() -> TopicPool<u32> {
        TopicPool::new(vec![
            TopicDocuments::new("alpha", vec![1, 2, 3]),
            TopicDocuments::new("beta", vec![10]),
            TopicDocuments::new("gamma", Vec::new()),
        ])
    }

    #[test]
    fn names_and_counts_follow_enumeration_order() {
        let p = pool();
        assert_eq!(p.len(), 3);
        assert_eq!(p.name(TopicId(1)).unwrap(), "beta");
        assert_eq!(p.remaining(TopicId(0)).unwrap(), 3);
        assert_eq!(p.remaining(TopicId(2)).unwrap(), 0);
        assert_eq!(p.total_remaining(), 4);
        assert_eq!(p.names(), vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn draw_removes_each_document_exactly_once() {
        let mut p = pool();
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = Vec::new();
        for expected_left in (0..3).rev() {
            seen.push(p.draw(TopicId(0), &mut rng).unwrap());
            assert_eq!(p.remaining(TopicId(0)).unwrap(), expected_left);
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(p.initial(TopicId(0)).unwrap(), 3);
    }

    #[test]
    fn drawing_from_empty_topic_is_reported() {
        let mut p = pool();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            p.draw(TopicId(2), &mut rng),
            Err(EngineError::ExhaustedTopic(TopicId(2)))
        );
        assert_eq!(p.draw(TopicId(1), &mut rng), Ok(10));
        assert_eq!(
            p.draw(TopicId(1), &mut rng),
            Err(EngineError::ExhaustedTopic(TopicId(1)))
        );
    }

    #[test]
    fn unknown_topic_is_rejected() {
        let mut p = pool();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            p.remaining(TopicId(9)),
            Err(EngineError::UnknownTopic(TopicId(9)))
        );
        assert!(p.draw(TopicId(9), &mut rng).is_err());
    }

    #[test]
    fn draws_cover_the_whole_topic_uniformly() {
        let mut hits = [0u32; 4];
        for seed in 0..4000u64 {
            let mut p = TopicPool::new(vec![TopicDocuments::new("t", vec![0usize, 1, 2, 3])]);
            let mut rng = StdRng::seed_from_u64(seed);
            hits[p.draw(TopicId(0), &mut rng).unwrap()] += 1;
        }
        for (doc, count) in hits.iter().enumerate() {
            assert!(
                (800..1200).contains(count),
                "document {doc} drawn {count} times out of 4000"
            );
        }
    }
}
