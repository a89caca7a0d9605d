//! Simulation configuration.
//!
//! Defaults mirror the classic concept-shift / concept-drift generators:
//! five starting topics, windows of 100 documents, a minimum of three active
//! topics and a 5% chance of a regime change before each window. Drifts fade
//! the outgoing topic over 10 windows and ramp the incoming one over 15.
//!
//! The RNG seed may come from the `TOPICDRIFT_SEED` environment variable
//! (decimal or `0x`-prefixed hex, `_` separators allowed). Without a seed the
//! engine seeds itself from OS entropy.

use serde::Serialize;

use crate::error::{EngineError, Result};

/// Environment variable consulted by [`seed_from_env`].
pub const SEED_ENV_VAR: &str = "TOPICDRIFT_SEED";

/// Regime-change policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegimePolicy {
    /// Abrupt activation/deactivation of whole topics.
    Shift,
    /// Gradual replacement of one topic by another.
    Drift,
}

impl RegimePolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shift => "shift",
            Self::Drift => "drift",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShiftParams {
    /// Probability of attempting a shift before each window.
    pub shift_prob: f64,
}

impl Default for ShiftParams {
    fn default() -> Self {
        Self { shift_prob: 0.05 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DriftParams {
    /// Probability of starting a drift before a window while stable.
    pub drift_prob: f64,
    /// Windows over which the outgoing topic fades to zero.
    pub decrease_windows: usize,
    /// Windows over which the incoming topic ramps up. Must exceed `decrease_windows`.
    pub increase_windows: usize,
}

impl Default for DriftParams {
    fn default() -> Self {
        Self {
            drift_prob: 0.05,
            decrease_windows: 10,
            increase_windows: 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum RegimeParams {
    Shift(ShiftParams),
    Drift(DriftParams),
}

impl RegimeParams {
    #[must_use]
    pub const fn policy(&self) -> RegimePolicy {
        match self {
            Self::Shift(_) => RegimePolicy::Shift,
            Self::Drift(_) => RegimePolicy::Drift,
        }
    }

    /// Default parameters for `policy`.
    #[must_use]
    pub fn default_for(policy: RegimePolicy) -> Self {
        match policy {
            RegimePolicy::Shift => Self::Shift(ShiftParams::default()),
            RegimePolicy::Drift => Self::Drift(DriftParams::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationConfig {
    /// Number of topics active at the start.
    pub k: usize,
    /// Documents per window.
    pub window_size: usize,
    /// The run ends once fewer topics than this are active.
    pub min_topics: usize,
    pub regime: RegimeParams,
    /// RNG seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Optional cap on the number of windows produced by `EngineState::run`.
    pub max_windows: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            k: 5,
            window_size: 100,
            min_topics: 3,
            regime: RegimeParams::Drift(DriftParams::default()),
            seed: None,
            max_windows: None,
        }
    }
}

impl SimulationConfig {
    /// Default configuration for `policy`.
    #[must_use]
    pub fn for_policy(policy: RegimePolicy) -> Self {
        Self {
            regime: RegimeParams::default_for(policy),
            ..Self::default()
        }
    }

    /// Check the parameters against a pool of `topic_count` topics.
    pub fn validate(&self, topic_count: usize) -> Result<()> {
        let invalid = |msg: String| Err(EngineError::InvalidRegimeParameters(msg));
        if self.k == 0 {
            return invalid("k must be at least 1".to_string());
        }
        if self.k > topic_count {
            return invalid(format!(
                "k = {} exceeds the {topic_count} available topics",
                self.k
            ));
        }
        if self.window_size == 0 {
            return invalid("window_size must be at least 1".to_string());
        }
        if self.min_topics == 0 {
            return invalid("min_topics must be at least 1".to_string());
        }
        match self.regime {
            RegimeParams::Shift(p) => check_probability("shift_prob", p.shift_prob),
            RegimeParams::Drift(p) => {
                check_probability("drift_prob", p.drift_prob)?;
                if p.increase_windows <= p.decrease_windows {
                    return invalid(format!(
                        "increase_windows ({}) must be greater than decrease_windows ({})",
                        p.increase_windows, p.decrease_windows
                    ));
                }
                Ok(())
            }
        }
    }
}

fn check_probability(name: &str, p: f64) -> Result<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(EngineError::InvalidRegimeParameters(format!(
            "{name} must lie in [0, 1], got {p}"
        )))
    }
}

/// Parse a seed written in decimal or `0x` hex, with optional `_` separators.
#[must_use]
pub fn parse_seed(raw: &str) -> Option<u64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != '_').collect();
    if let Some(hex) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16).ok()
    } else {
        cleaned.parse().ok()
    }
}

/// Seed from [`SEED_ENV_VAR`], if set and well-formed.
#[must_use]
pub fn seed_from_env() -> Option<u64> {
    std::env::var(SEED_ENV_VAR)
        .ok()
        .and_then(|raw| parse_seed(&raw))
}
