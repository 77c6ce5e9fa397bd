//! Error types for Idle Gamble

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum IgError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias
pub type IgResult<T> = Result<T, IgError>;
