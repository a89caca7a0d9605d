//! Simulation state and the step loop.
//!
//! An [`EngineState`] owns everything a run mutates: the topic pool, the
//! ledger, the regime controller and its own RNG. Independent simulations
//! never share state, and the state is consistent after every completed
//! [`EngineState::step`], so a caller may stop at any window boundary.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::{RegimePolicy, SimulationConfig};
use crate::error::Result;
use crate::events::{EngineEvent, EventLog};
use crate::ledger::TopicLedger;
use crate::pool::{TopicId, TopicPool, TopicSource};
use crate::regime::{Regime, RegimeController};
use crate::sampler::{Window, WindowSampler};
use crate::simplex::ProbabilitySimplex;

#[derive(Debug, Clone)]
pub struct EngineState<D> {
    config: SimulationConfig,
    pool: TopicPool<D>,
    ledger: TopicLedger,
    regime: Regime,
    sampler: WindowSampler,
    rng: StdRng,
    events: EventLog,
    windows_generated: usize,
}

impl<D> EngineState<D> {
    /// Validate `config`, load the topics and pick the starting active set.
    ///
    /// `k` topics are chosen uniformly without replacement; the rest form the
    /// reserve in enumeration order. Shift runs start from uniform weights,
    /// drift runs from a flat Dirichlet draw.
    pub fn initialize<S>(source: S, config: &SimulationConfig) -> Result<Self>
    where
        S: TopicSource<Document = D>,
    {
        let topics = source.into_topics();
        config.validate(topics.len())?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let pool = TopicPool::new(topics);

        let chosen = rand::seq::index::sample(&mut rng, pool.len(), config.k).into_vec();
        let active: Vec<TopicId> = chosen.iter().copied().map(TopicId).collect();
        let reserve: Vec<TopicId> = pool.ids().filter(|t| !active.contains(t)).collect();

        let simplex = match config.regime.policy() {
            RegimePolicy::Shift => ProbabilitySimplex::uniform(active),
            RegimePolicy::Drift => ProbabilitySimplex::dirichlet(active, &mut rng),
        };

        Ok(Self {
            config: config.clone(),
            pool,
            ledger: TopicLedger::new(simplex, reserve),
            regime: Regime::from_params(&config.regime),
            sampler: WindowSampler::new(config.window_size, config.min_topics),
            rng,
            events: EventLog::default(),
            windows_generated: 0,
        })
    }

    /// Generate the next window, then let the regime prepare the one after it.
    pub fn step(&mut self) -> Result<Window<D>> {
        let index = self.windows_generated;
        self.events.set_window(index);
        let window = self.sampler.generate_window(
            index,
            &mut self.pool,
            &mut self.ledger,
            &mut self.regime,
            &mut self.rng,
            &mut self.events,
        )?;
        self.windows_generated += 1;

        self.events.set_window(self.windows_generated);
        self.regime
            .before_window(&mut self.ledger, &mut self.rng, &mut self.events)?;
        Ok(window)
    }

    /// Fewer than `min_topics` topics remain active.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.ledger.active_len() < self.config.min_topics
    }

    /// Terminal, or `max_windows` windows already exist.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.is_terminal()
            || self
                .config
                .max_windows
                .is_some_and(|cap| self.windows_generated >= cap)
    }

    /// Step until [`Self::is_done`].
    pub fn run(&mut self) -> Result<Vec<Window<D>>> {
        let mut windows = Vec::new();
        while !self.is_done() {
            windows.push(self.step()?);
        }
        Ok(windows)
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[must_use]
    pub fn pool(&self) -> &TopicPool<D> {
        &self.pool
    }

    #[must_use]
    pub fn ledger(&self) -> &TopicLedger {
        &self.ledger
    }

    #[must_use]
    pub fn regime(&self) -> &Regime {
        &self.regime
    }

    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.pool.len()
    }

    #[must_use]
    pub fn windows_generated(&self) -> usize {
        self.windows_generated
    }

    /// Take the events recorded since the previous drain.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain()
    }
}
