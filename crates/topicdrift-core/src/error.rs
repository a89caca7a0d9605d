//! Error kinds surfaced by the simulation engine.
//!
//! Only parameter validation is expected to fail in practice. The remaining
//! variants are precondition violations that every call site in the engine
//! guards against; they exist so that misuse of the public building blocks
//! fails loudly instead of corrupting the simplex.

use thiserror::Error;

use crate::pool::TopicId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("topic {0} has no remaining documents")]
    ExhaustedTopic(TopicId),
    #[error("removing topic {0} would leave the active set empty")]
    EmptyAfterRemoval(TopicId),
    #[error("invalid regime parameters: {0}")]
    InvalidRegimeParameters(String),
    #[error("topic {0} is not part of the pool")]
    UnknownTopic(TopicId),
    #[error("topic {0} is not in the active set")]
    InactiveTopic(TopicId),
    #[error("topic {0} is already in the active set")]
    DuplicateTopic(TopicId),
}

pub type Result<T> = std::result::Result<T, EngineError>;
