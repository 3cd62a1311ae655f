//! Error types for PostgreSQL transpilation.

use thiserror::Error;

/// Errors that can occur while compiling a universal query to SQL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranspileError {
    /// A condition or order entry names a field the schema does not know.
    #[error("unresolvable condition: field '{0}' is not defined in the schema")]
    UnresolvableField(String),

    /// A range map contains a key other than `gt`, `gte`, `lt`, `lte`.
    #[error("unknown operator '{operator}' for field '{field}'")]
    UnknownOperator { field: String, operator: String },

    /// `and` / `or` was given something other than a list of objects.
    #[error("'{0}' expects a list of condition objects")]
    InvalidBooleanOperand(String),
}

/// Convenience alias for results with [`TranspileError`].
pub type Result<T> = std::result::Result<T, TranspileError>;
