//! Error types for the outcome screener

use thiserror::Error;

/// Result type alias for screener operations
pub type Result<T> = std::result::Result<T, ScreenerError>;

/// Main error type for training, artifact handling and inference
#[derive(Error, Debug)]
pub enum ScreenerError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("y contains previously unseen label: {value:?} (column {column})")]
    UnknownValue { column: String, value: String },

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Missing required artifact(s): {}", .0.join(", "))]
    ArtifactMissing(Vec<String>),

    #[error("Artifact error: {0}")]
    ArtifactError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<polars::error::PolarsError> for ScreenerError {
    fn from(err: polars::error::PolarsError) -> Self {
        ScreenerError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for ScreenerError {
    fn from(err: serde_json::Error) -> Self {
        ScreenerError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for ScreenerError {
    fn from(err: bincode::Error) -> Self {
        ScreenerError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for ScreenerError {
    fn from(err: ndarray::ShapeError) -> Self {
        ScreenerError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
