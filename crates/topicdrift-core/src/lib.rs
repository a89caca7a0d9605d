//! # topicdrift-core
//!
//! Regime simulation engine for synthetic, time-ordered document streams with
//! controlled non-stationarity.
//!
//! # Architecture
//!
//! - **Topic pool** (`pool`): remaining documents per topic, drawn without replacement
//! - **Probability simplex** (`simplex`): active topics and their sampling weights
//! - **Topic ledger** (`ledger`): active / reserve / retired partition of the topics
//! - **Regime controllers** (`regime`): abrupt shift and gradual drift policies
//! - **Window sampler** (`sampler`): fills one window per step
//! - **Engine** (`engine`): `initialize` / `step` / `is_terminal` / `run`
//! - **Configuration** (`config`): parameters, defaults and validation
//! - **Events** (`events`): journal of regime decisions for the caller's log
//!
//! The crate performs no I/O. Documents are opaque handles supplied through
//! [`TopicSource`] and returned inside [`Window`]s.

#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod ledger;
pub mod pool;
pub mod regime;
pub mod sampler;
pub mod simplex;

pub use config::{DriftParams, RegimeParams, RegimePolicy, ShiftParams, SimulationConfig};
pub use engine::EngineState;
pub use error::{EngineError, Result};
pub use events::{EngineEvent, EventKind};
pub use ledger::TopicLedger;
pub use pool::{TopicDocuments, TopicId, TopicPool, TopicSource};
pub use regime::{
    AbruptShift, DriftPhase, ExhaustionResponse, GradualDrift, Regime, RegimeController,
};
pub use sampler::{Sample, Window, WindowSampler};
pub use simplex::{MASS_TOLERANCE, ProbabilitySimplex};
