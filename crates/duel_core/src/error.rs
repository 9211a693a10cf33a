//! Error types for the duel simulation.

use thiserror::Error;

/// Result type alias using [`DuelError`].
pub type Result<T> = std::result::Result<T, DuelError>;

/// Top-level error type for the duel simulation.
///
/// Combat actions never produce errors: mistimed or redundant input is
/// silently ignored. Errors are reserved for setup and caller misuse.
#[derive(Debug, Error)]
pub enum DuelError {
    /// Every entity slot is occupied.
    #[error("Entity store is full ({capacity} slots)")]
    StoreFull {
        /// Capacity of the store.
        capacity: usize,
    },

    /// The world has no active player character to drive the frame.
    #[error("No active player character in the world")]
    NoActivePlayer,

    /// Stage configuration is inconsistent.
    #[error("Invalid stage configuration: {0}")]
    InvalidConfig(String),

    /// Configuration text could not be parsed.
    #[error("Failed to parse stage configuration: {message}")]
    ConfigParse {
        /// Parser error message.
        message: String,
    },

    /// Snapshot encoding failed.
    #[error("Failed to encode simulation snapshot: {0}")]
    Snapshot(String),
}
