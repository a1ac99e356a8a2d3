//! Error types for session start-up, tuning data and persistence.

use thiserror::Error;

/// Errors that abort a session start or a store write.
///
/// Cooldowns, blocked attacks and other "not yet" conditions are not
/// errors; those calls simply return `false`.
#[derive(Debug, Error)]
pub enum KnightError {
    /// The host could not provide a drawing surface.
    #[error("Render surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// Level data failed validation.
    #[error("Invalid level data: {0}")]
    InvalidLevel(String),

    /// A data file could not be read.
    #[error("Failed to read file '{path}': {details}")]
    ReadError { path: String, details: String },

    /// RON parsing failed.
    #[error("Parse error in '{path}': {details}")]
    ParseError { path: String, details: String },

    /// The key-value store rejected a write.
    #[error("Store write failed for '{key}': {details}")]
    Store { key: String, details: String },
}
