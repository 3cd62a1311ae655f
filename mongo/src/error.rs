//! Error types for document-store transpilation.

use thiserror::Error;

/// Errors that can occur while translating a universal query to documents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MongoError {
    /// `and` / `or` was given something other than a list of objects.
    #[error("'{0}' expects a list of condition objects")]
    InvalidBooleanOperand(String),
}

/// Convenience alias for results with [`MongoError`].
pub type Result<T> = std::result::Result<T, MongoError>;
