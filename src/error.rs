//! # Error Types
//!
//! Custom error types for Asset Monitor using `thiserror`.

use thiserror::Error;

/// Main error type for Asset Monitor
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Rejected threshold edit
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Unparsable operator command
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

/// Result type alias for Asset Monitor
pub type Result<T> = std::result::Result<T, MonitorError>;
