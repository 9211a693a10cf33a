//! Error types for the headless runner.

use thiserror::Error;

use duel_core::error::DuelError;

/// Errors raised while loading inputs for or running a headless match.
#[derive(Debug, Error)]
pub enum HeadlessError {
    /// Input file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),
    /// Failed to read an input file.
    #[error("Failed to read file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse a RON document.
    #[error("Failed to parse RON: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Failed to encode or decode JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Unknown player strategy name.
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),
    /// The simulation rejected the stage or a tick.
    #[error("Simulation error: {0}")]
    Simulation(#[from] DuelError),
}

/// Result type for headless operations.
pub type Result<T> = std::result::Result<T, HeadlessError>;

/// Read a text file, reporting a missing file distinctly from an IO failure.
pub(crate) fn read_file(path: &std::path::Path) -> Result<String> {
    if !path.exists() {
        return Err(HeadlessError::FileNotFound(path.display().to_string()));
    }
    Ok(std::fs::read_to_string(path)?)
}
