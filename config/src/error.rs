//! Error types for model file handling.

use thiserror::Error;
use uql_core::SchemaError;

/// Errors that can occur while loading, saving or building a model file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The tables do not form a valid model.
    #[error("invalid model: {0}")]
    SchemaError(#[from] SchemaError),

    /// The file extension is neither YAML nor JSON.
    #[error("unsupported model file extension: {0}")]
    UnsupportedExtension(String),
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;
