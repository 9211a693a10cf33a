//! Single-match headless runner.
//!
//! Plays one seeded stage to completion: the strategy drives the controller,
//! [`FrameRng`] feeds the opponent, and [`Progression`] decides when the
//! match is over.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use duel_core::config::StageConfig;
use duel_core::simulation::Simulation;
use duel_core::stage::Progression;

use crate::error::{read_file, Result};
use crate::metrics::{MatchOutcome, MatchReport};
use crate::rng::FrameRng;
use crate::strategies::PlayerStrategy;

/// Default tick limit: five minutes at 60 ticks per second.
pub const DEFAULT_MAX_TICKS: u64 = 5 * 60 * 60;

/// Offset separating the strategy's random stream from the opponent's.
const STRATEGY_STREAM: u64 = 0x5EED_5EED;

/// Configuration for one headless match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Stage layout and opponent difficulty.
    pub stage: StageConfig,
    /// How the player is driven.
    pub strategy: PlayerStrategy,
    /// Seed for every random value in the match.
    pub seed: u64,
    /// Maximum ticks before the match is called a timeout.
    pub max_ticks: u64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            stage: StageConfig::default(),
            strategy: PlayerStrategy::default(),
            seed: 0,
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }
}

impl MatchConfig {
    /// Set seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: PlayerStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Load a stage layout from a RON file.
pub fn load_stage<P: AsRef<Path>>(path: P) -> Result<StageConfig> {
    let contents = read_file(path.as_ref())?;
    Ok(StageConfig::from_ron_str(&contents)?)
}

/// Play one match to completion and report on it.
pub fn run_match(config: &MatchConfig) -> Result<MatchReport> {
    let mut sim = Simulation::from_stage(&config.stage)?;
    let mut opponent_rng = FrameRng::new(config.seed);
    let mut strategy_rng = FrameRng::new(config.seed ^ STRATEGY_STREAM);
    let mut report = MatchReport::new(config.seed, config.strategy.name());

    info!(
        seed = config.seed,
        strategy = config.strategy.name(),
        difficulty = ?config.stage.difficulty,
        "Starting match"
    );

    let mut outcome = MatchOutcome::Timeout;
    while sim.tick() < config.max_ticks {
        let input = config
            .strategy
            .input(sim.tick(), sim.world(), &mut strategy_rng);
        let (_, events) = sim.advance_with_events(input, opponent_rng.next_u16())?;
        report.record(sim.world(), &events);

        match Progression::evaluate(&events, &config.stage) {
            Progression::Continue => {}
            Progression::EnterArea(area) => {
                debug!(tick = sim.tick(), ?area, "Entering area");
                report.enter_area(area);
            }
            Progression::GameOver => {
                outcome = MatchOutcome::GameOver;
                break;
            }
            Progression::StageClear => {
                outcome = MatchOutcome::StageClear;
                break;
            }
        }
    }

    report.finalize(sim.tick(), outcome, sim.state_hash());
    info!(
        seed = config.seed,
        ticks = report.duration_ticks,
        outcome = ?report.outcome,
        "Match finished"
    );
    Ok(report)
}
