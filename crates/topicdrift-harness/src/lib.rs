//! Collaborators around the topicdrift engine.
//!
//! This crate provides:
//! - Corpus loading: a `<root>/<topic>/<document>` tree as a topic source
//! - Dataset export: sampled windows copied to `window-NN/<topic>/`
//! - Overview: per-window composition CSV
//! - Structured logging: JSONL run log plus a SHA-256 artifact index
//! - Run orchestration behind the `topicdrift` binary

#![forbid(unsafe_code)]

pub mod corpus;
pub mod error;
pub mod export;
pub mod overview;
pub mod run;
pub mod structured_log;

pub use corpus::Corpus;
pub use error::{HarnessError, Result};
pub use export::{ExportOptions, ExportSummary, ExportedWindow};
pub use run::{RunRequest, RunSummary, execute};
