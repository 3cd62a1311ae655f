//! Core types shared by every universal-query (UQL) backend.
//!
//! This crate defines the backend-agnostic half of the transpiler:
//!
//! - [`FieldType`]: the closed type catalog driving value encoding.
//! - [`Value`] / [`Document`]: raw query values with ordered documents.
//! - [`Uql`], [`OrderSpec`]: the query object callers hand to a backend.
//! - [`TableSchema`], [`Model`], [`SchemaLookup`]: field type and ownership
//!   resolution.
//!
//! Validation ([`validate_definition`], [`validate_model`]) rejects unknown
//! types and duplicate names when a model is defined, never at query time.
//!
//! # Example
//!
//! ```
//! use uql_core::*;
//!
//! let table = TableSchema::from_fields(
//!     "single_table",
//!     [("name", FieldType::String), ("createdAt", FieldType::Date)],
//! )
//! .unwrap();
//! let model = Model::single(table);
//!
//! let uql: Uql = serde_json::from_str(r#"{"where": {"createdAt": {"gte": {"$date": "2001-02-11T00:00:00Z"}}}}"#).unwrap();
//! let uql = uql.snake_cased();
//! let where_ = uql.where_.unwrap();
//! assert!(where_.contains_key("created_at"));
//! assert_eq!(model.field_type("created_at"), Some(FieldType::Date));
//! ```

mod case;
mod query;
mod schema;
mod types;
mod validate;
mod value;

pub use case::{snake_document, snake_key};
pub use query::{
    BOOLEAN_OPERATORS, BooleanOperator, COMPARISON_OPERATORS, ComparisonOperator, Direction,
    OrderBy, OrderSpec, Uql,
};
pub use schema::{DEFAULT_PRIMARY_KEY, Model, Qualify, SchemaLookup, TableSchema, root_field};
pub use types::FieldType;
pub use validate::{SchemaError, validate_definition, validate_model};
pub use value::{DATE_KEY, Document, Value, format_iso, parse_date};
