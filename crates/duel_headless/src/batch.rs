//! Batch match runner.
//!
//! Runs many seeds in parallel using rayon and reduces their reports to a
//! [`BatchSummary`].

use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use duel_core::config::StageConfig;

use crate::metrics::{BatchSummary, MatchReport};
use crate::runner::{run_match, MatchConfig, DEFAULT_MAX_TICKS};
use crate::strategies::PlayerStrategy;

/// Configuration for a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Stage every match plays.
    pub stage: StageConfig,
    /// How the player is driven.
    pub strategy: PlayerStrategy,
    /// Number of matches to run.
    pub match_count: u32,
    /// Maximum parallel matches (0 = use rayon default).
    pub parallel_matches: u32,
    /// Starting seed; match `i` uses `seed_start + i`.
    pub seed_start: u64,
    /// Maximum ticks per match.
    pub max_ticks: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            stage: StageConfig::default(),
            strategy: PlayerStrategy::Counter,
            match_count: 100,
            parallel_matches: 0,
            seed_start: 0,
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }
}

impl BatchConfig {
    /// Create config for `match_count` matches of `strategy`.
    #[must_use]
    pub fn new(strategy: PlayerStrategy, match_count: u32) -> Self {
        Self {
            strategy,
            match_count,
            ..Default::default()
        }
    }

    /// Set seed start.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Config for the match at `index`.
    fn match_config(&self, index: u32) -> MatchConfig {
        MatchConfig {
            stage: self.stage.clone(),
            strategy: self.strategy.clone(),
            seed: self.seed_start.wrapping_add(u64::from(index)),
            max_ticks: self.max_ticks,
        }
    }
}

/// Results from a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used.
    pub config: BatchConfig,
    /// Individual match reports, in seed order.
    pub matches: Vec<MatchReport>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Total runtime.
    pub duration_seconds: f64,
    /// Errors encountered.
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Error during batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Match index.
    pub match_index: u32,
    /// Seed used.
    pub seed: u64,
    /// Error message.
    pub message: String,
}

/// Run a batch of matches.
pub fn run_batch(config: &BatchConfig) -> BatchResults {
    let start = Instant::now();

    if config.parallel_matches > 0 {
        // Only the first configuration of the global pool takes effect.
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_matches as usize)
            .build_global()
            .ok();
    }

    info!(
        matches = config.match_count,
        strategy = config.strategy.name(),
        seed_start = config.seed_start,
        "Starting batch"
    );

    let outcomes: Vec<(u32, u64, Result<MatchReport, String>)> = (0..config.match_count)
        .into_par_iter()
        .map(|index| {
            let match_config = config.match_config(index);
            let result = run_match(&match_config).map_err(|e| e.to_string());
            (index, match_config.seed, result)
        })
        .collect();

    let mut matches = Vec::with_capacity(outcomes.len());
    let mut errors = Vec::new();
    for (match_index, seed, result) in outcomes {
        match result {
            Ok(report) => matches.push(report),
            Err(message) => {
                warn!(match_index, seed, %message, "Match failed");
                errors.push(BatchError {
                    match_index,
                    seed,
                    message,
                });
            }
        }
    }

    let summary = BatchSummary::from_reports(&matches);
    let duration_seconds = start.elapsed().as_secs_f64();
    info!(
        completed = matches.len(),
        failed = errors.len(),
        clear_rate = summary.clear_rate,
        duration_seconds,
        "Batch finished"
    );

    BatchResults {
        config: config.clone(),
        matches,
        summary,
        duration_seconds,
        errors,
    }
}

/// Play the same seed `runs` times and check every run ends in the same state.
pub fn verify_determinism(config: &MatchConfig, runs: u32) -> bool {
    let mut reference: Option<MatchReport> = None;
    for run in 0..runs {
        let report = match run_match(config) {
            Ok(report) => report,
            Err(e) => {
                warn!(run, error = %e, "Verification run failed");
                return false;
            }
        };
        match &reference {
            None => reference = Some(report),
            Some(expected) if *expected != report => {
                warn!(
                    run,
                    expected = expected.final_state_hash,
                    actual = report.final_state_hash,
                    "Non-determinism detected"
                );
                return false;
            }
            Some(_) => {}
        }
    }
    true
}
