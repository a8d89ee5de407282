use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("egg #{index}: {field} must be finite and non-negative (got {value})")]
    InvalidEggConfig {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("mask data has {actual} bytes, expected {expected} for {width}x{height}")]
    MaskSizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
