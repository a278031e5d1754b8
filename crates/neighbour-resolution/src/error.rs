//! Error types for the neighbour resolution engine.

use thiserror::Error;

/// Errors surfaced by the neighbour resolution engine.
///
/// Packet-path outcomes (irrelevant frames, empty registrations, egress
/// guard drops) are not errors and never appear here.
#[derive(Debug, Error)]
pub enum NeighbourError {
    /// Configuration could not be parsed, serialized or validated
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error while reading or writing configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for neighbour resolution operations
pub type Result<T> = std::result::Result<T, NeighbourError>;
