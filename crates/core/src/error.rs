//! Core error types

use thiserror::Error;

/// Core error type for ZoneGate
#[derive(Debug, Error)]
pub enum CoreError {
    /// Unknown access-level token
    #[error("Unknown access level: {0}")]
    UnknownLevel(String),

    /// Unknown zone token
    #[error("Unknown target zone: {0}")]
    UnknownTarget(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
