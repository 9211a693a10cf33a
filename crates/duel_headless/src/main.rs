//! Headless duel runner.
//!
//! Plays stages without graphics and prints JSON reports to stdout.
//! Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Play one stage with the counter strategy
//! cargo run -p duel_headless -- run --strategy counter --seed 7
//!
//! # Replay a RON input script against a custom stage
//! cargo run -p duel_headless -- run --stage stages/short.ron --script inputs.ron
//!
//! # Play a batch and save full results
//! cargo run -p duel_headless -- batch --count 1000 --output results/batch.json
//!
//! # Verify determinism
//! cargo run -p duel_headless -- verify --seed 12345 --runs 5
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use duel_core::ai::Difficulty;
use duel_core::config::StageConfig;
use duel_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    runner::{load_stage, run_match, MatchConfig, DEFAULT_MAX_TICKS},
    strategies::PlayerStrategy,
    Result,
};

#[derive(Parser)]
#[command(name = "duel_headless")]
#[command(about = "Headless duel runner for scripted playtesting and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single seeded stage
    Run {
        /// Stage RON file (defaults to the built-in stage)
        #[arg(long)]
        stage: Option<PathBuf>,

        /// Player strategy: idle, mash or counter
        #[arg(short, long, default_value = "counter")]
        strategy: String,

        /// RON input script; overrides --strategy
        #[arg(long)]
        script: Option<PathBuf>,

        /// Opponent difficulty rate override
        #[arg(short, long)]
        difficulty: Option<u16>,

        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Maximum match length in ticks
        #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
        max_ticks: u64,
    },

    /// Play many seeds in parallel
    Batch {
        /// Stage RON file (defaults to the built-in stage)
        #[arg(long)]
        stage: Option<PathBuf>,

        /// Player strategy: idle, mash or counter
        #[arg(short, long, default_value = "counter")]
        strategy: String,

        /// Opponent difficulty rate override
        #[arg(short, long)]
        difficulty: Option<u16>,

        /// Number of matches to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel matches (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Maximum match length in ticks
        #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
        max_ticks: u64,

        /// Write full results JSON here; only the summary goes to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify determinism by running same seed multiple times
    Verify {
        /// Stage RON file (defaults to the built-in stage)
        #[arg(long)]
        stage: Option<PathBuf>,

        /// Player strategy: idle, mash or counter
        #[arg(short, long, default_value = "mash")]
        strategy: String,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs to stderr; stdout carries the JSON reports
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let result = match cli.command {
        Some(Commands::Run {
            stage,
            strategy,
            script,
            difficulty,
            seed,
            max_ticks,
        }) => cmd_run(stage, &strategy, script, difficulty, seed, max_ticks),
        Some(Commands::Batch {
            stage,
            strategy,
            difficulty,
            count,
            parallel,
            seed,
            max_ticks,
            output,
        }) => cmd_batch(
            stage, &strategy, difficulty, count, parallel, seed, max_ticks, output,
        ),
        Some(Commands::Verify {
            stage,
            strategy,
            seed,
            runs,
        }) => cmd_verify(stage, &strategy, seed, runs),
        None => cmd_run(None, "counter", None, None, 0, DEFAULT_MAX_TICKS),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Resolve the stage file and difficulty override.
fn stage_config(path: Option<PathBuf>, difficulty: Option<u16>) -> Result<StageConfig> {
    let mut stage = match path {
        Some(path) => load_stage(path)?,
        None => StageConfig::default(),
    };
    if let Some(rate) = difficulty {
        stage.difficulty = Difficulty::Custom(rate);
    }
    Ok(stage)
}

/// Play a single stage and print its report
fn cmd_run(
    stage: Option<PathBuf>,
    strategy: &str,
    script: Option<PathBuf>,
    difficulty: Option<u16>,
    seed: u64,
    max_ticks: u64,
) -> Result<()> {
    let strategy = match script {
        Some(path) => PlayerStrategy::load_script(path)?,
        None => PlayerStrategy::from_name(strategy)?,
    };
    let config = MatchConfig {
        stage: stage_config(stage, difficulty)?,
        strategy,
        seed,
        max_ticks,
    };

    let report = run_match(&config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Play a batch of seeds and print the summary
#[allow(clippy::too_many_arguments)]
fn cmd_batch(
    stage: Option<PathBuf>,
    strategy: &str,
    difficulty: Option<u16>,
    count: u32,
    parallel: u32,
    seed: u64,
    max_ticks: u64,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = BatchConfig {
        stage: stage_config(stage, difficulty)?,
        strategy: PlayerStrategy::from_name(strategy)?,
        match_count: count,
        parallel_matches: parallel,
        seed_start: seed,
        max_ticks,
    };

    let results = run_batch(&config);
    if let Some(path) = output {
        results.save(&path)?;
        tracing::info!("Results saved to {}", path.display());
    }
    println!("{}", serde_json::to_string_pretty(&results.summary)?);

    if !results.errors.is_empty() {
        eprintln!("{} matches failed", results.errors.len());
        std::process::exit(1);
    }
    Ok(())
}

/// Verify a seed plays out identically every time
fn cmd_verify(stage: Option<PathBuf>, strategy: &str, seed: u64, runs: u32) -> Result<()> {
    tracing::info!("Verifying determinism: seed {} ({} runs)", seed, runs);

    let config = MatchConfig {
        stage: stage_config(stage, None)?,
        strategy: PlayerStrategy::from_name(strategy)?,
        seed,
        max_ticks: DEFAULT_MAX_TICKS,
    };

    if verify_determinism(&config, runs) {
        eprintln!("PASS: All {runs} runs produced identical results");
        Ok(())
    } else {
        eprintln!("FAIL: Non-determinism detected!");
        std::process::exit(1);
    }
}
