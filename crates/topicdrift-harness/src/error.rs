//! Harness error type.

use std::path::PathBuf;

use thiserror::Error;
use topicdrift_core::EngineError;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("engine: {0}")]
    Engine(#[from] EngineError),
    #[error("output directory {} already exists", .0.display())]
    OutputExists(PathBuf),
    #[error("no topic directories found in {}", .0.display())]
    EmptyCorpus(PathBuf),
    #[error("invalid seed '{0}' (expected decimal or 0x-prefixed hex)")]
    InvalidSeed(String),
}

pub type Result<T> = std::result::Result<T, HarnessError>;
