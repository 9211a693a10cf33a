//! Headless duel runner for scripted playtesting and CI verification.
//!
//! This crate plays whole stages without a screen or a controller:
//!
//! - **Scripted play**: a [`strategies::PlayerStrategy`] drives the player
//! - **Batch runs**: many seeds in parallel, reduced to a summary
//! - **Determinism checks**: the same seed always ends in the same state
//!
//! Reports go to stdout as JSON; logs go to stderr.
//!
//! # Example
//!
//! ```bash
//! # Play one seeded stage
//! cargo run -p duel_headless -- run --strategy counter --seed 7
//!
//! # Play 500 seeds in parallel
//! cargo run -p duel_headless -- batch --strategy mash --count 500
//!
//! # Verify determinism
//! cargo run -p duel_headless -- verify --seed 12345 --runs 5
//! ```

#![warn(missing_docs)]

pub mod batch;
pub mod error;
pub mod metrics;
pub mod rng;
pub mod runner;
pub mod strategies;

pub use batch::{run_batch, BatchConfig, BatchResults};
pub use error::{HeadlessError, Result};
pub use metrics::{BatchSummary, MatchOutcome, MatchReport};
pub use rng::FrameRng;
pub use runner::{load_stage, run_match, MatchConfig};
pub use strategies::PlayerStrategy;
