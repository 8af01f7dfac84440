//! Error types for ZooEQ

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum ZooError {
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Invalid slope order: {0} (expected 1-4)")]
    InvalidSlope(u8),

    #[error("Invalid FFT order: {0} samples (expected 2048, 4096 or 8192)")]
    InvalidFftOrder(usize),

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias
pub type ZooResult<T> = Result<T, ZooError>;
