//! Error types for GachaForge

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum GfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Catalog error: {0}")]
    Catalog(String),
}

/// Result type alias
pub type GfResult<T> = Result<T, GfError>;
