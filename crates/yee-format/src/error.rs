//! Error types for yee-format.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{0}")]
    Engine(#[from] yee_em::FdtdError),
}

pub type Result<T> = std::result::Result<T, FormatError>;
