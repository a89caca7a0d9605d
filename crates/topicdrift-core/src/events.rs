//! Journal of regime decisions and exhaustion handling.
//!
//! The engine never prints; callers drain these events after each step and
//! route them to their own log sink.

use serde::Serialize;

use crate::pool::TopicId;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// A shift moved an active topic to the reserve.
    ShiftDeactivated { topic: TopicId },
    /// A shift activated a reserve topic.
    ShiftActivated { topic: TopicId },
    /// A shift tried to activate a topic but the reserve was empty.
    ShiftSkipped,
    DriftStarted {
        increase: TopicId,
        decrease: TopicId,
        target: f64,
    },
    /// The fading topic reached the end of its ramp and went back to the reserve.
    DecreaseTopicRemoved { topic: TopicId },
    DriftEnded,
    /// A drift topic ran out of documents mid-drift.
    DriftAborted { topic: TopicId },
    /// An exhausted topic was removed and its mass redistributed.
    TopicRetired { topic: TopicId },
    /// An exhausted topic keeps its mass until the running drift ends.
    TopicDeferred { topic: TopicId },
    /// Topics deferred during a drift were dropped in bulk.
    PendingRetired { topics: Vec<TopicId> },
}

impl EventKind {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ShiftDeactivated { .. } => "shift_deactivated",
            Self::ShiftActivated { .. } => "shift_activated",
            Self::ShiftSkipped => "shift_skipped",
            Self::DriftStarted { .. } => "drift_started",
            Self::DecreaseTopicRemoved { .. } => "decrease_topic_removed",
            Self::DriftEnded => "drift_ended",
            Self::DriftAborted { .. } => "drift_aborted",
            Self::TopicRetired { .. } => "topic_retired",
            Self::TopicDeferred { .. } => "topic_deferred",
            Self::PendingRetired { .. } => "pending_retired",
        }
    }

    /// The single topic the event is about, when there is one.
    #[must_use]
    pub fn topic(&self) -> Option<TopicId> {
        match self {
            Self::ShiftDeactivated { topic }
            | Self::ShiftActivated { topic }
            | Self::DecreaseTopicRemoved { topic }
            | Self::DriftAborted { topic }
            | Self::TopicRetired { topic }
            | Self::TopicDeferred { topic } => Some(*topic),
            Self::DriftStarted { increase, .. } => Some(*increase),
            Self::ShiftSkipped | Self::DriftEnded | Self::PendingRetired { .. } => None,
        }
    }
}

/// One journal entry, stamped with the index of the window it belongs to.
///
/// Events raised while preparing the next window carry that next index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineEvent {
    pub window: usize,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Append-only event buffer shared by the sampler and the regime controller.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    window: usize,
    events: Vec<EngineEvent>,
}

impl EventLog {
    pub fn set_window(&mut self, window: usize) {
        self.window = window;
    }

    pub fn push(&mut self, kind: EventKind) {
        self.events.push(EngineEvent {
            window: self.window,
            kind,
        });
    }

    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }

    #[must_use]
    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_stable() {
        assert_eq!(EventKind::DriftEnded.name(), "drift_ended");
        assert_eq!(
            EventKind::TopicDeferred { topic: TopicId(3) }.name(),
            "topic_deferred"
        );
    }

    #[test]
    fn events_serialize_flat_with_kind_tag() {
        let event = EngineEvent {
            window: 4,
            kind: EventKind::DriftStarted {
                increase: TopicId(7),
                decrease: TopicId(1),
                target: 0.25,
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["window"], 4);
        assert_eq!(json["kind"], "drift_started");
        assert_eq!(json["increase"], 7);
        assert_eq!(json["decrease"], 1);
        assert_eq!(event.kind.topic(), Some(TopicId(7)));
    }

    #[test]
    fn log_stamps_current_window_and_drains() {
        let mut log = EventLog::default();
        log.set_window(2);
        log.push(EventKind::ShiftSkipped);
        log.set_window(3);
        log.push(EventKind::DriftEnded);
        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].window, 2);
        assert_eq!(drained[1].window, 3);
        assert!(log.drain().is_empty());
    }
}
