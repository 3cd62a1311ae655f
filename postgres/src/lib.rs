//! PostgreSQL target for universal queries.
//!
//! This crate compiles [`Uql`](uql_core::Uql) condition trees and order
//! specifications into SQL text, with every value inlined as an escaped,
//! type-directed literal.
//!
//! # Architecture
//!
//! - **`value`**: literal encoding per [`FieldType`](uql_core::FieldType)
//! - **`condition`**: `where` classification and predicate rendering
//! - **`order`**: `ORDER BY` rendering
//! - **`transpiler`**: the facade and `SELECT`/`INSERT`/`UPDATE`/`DELETE`
//!   assembly
//!
//! # Quick start
//!
//! ```
//! use serde_json::json;
//! use uql_core::{FieldType, Model, TableSchema, Uql, Value};
//! use uql_postgres::PostgresTranspiler;
//!
//! let model = Model::single(
//!     TableSchema::from_fields(
//!         "single_table",
//!         [("name", FieldType::String), ("lastName", FieldType::String), ("age", FieldType::Integer)],
//!     )
//!     .unwrap(),
//! );
//! let transpiler = PostgresTranspiler::new(&model);
//!
//! let uql: Uql = serde_json::from_value(json!({
//!     "where": {"name": "Jon", "lastName": "Doe", "age": 23}
//! }))
//! .unwrap();
//! assert_eq!(
//!     transpiler.build_conditions_and_sorting(&uql).unwrap().conditions,
//!     " WHERE name='Jon' AND last_name='Doe' AND age=23"
//! );
//!
//! let data = Value::from(json!({"name": "Jon", "lastName": "Doe"})).into_document().unwrap();
//! assert_eq!(
//!     transpiler.insert(&data).unwrap().as_deref(),
//!     Some("INSERT INTO single_table (name, last_name) VALUES ('Jon', 'Doe')")
//! );
//! ```

mod condition;
mod error;
mod order;
mod transpiler;
mod value;

pub use condition::{Condition, ConditionCompiler, comparison_sql};
pub use error::{Result, TranspileError};
pub use order::OrderCompiler;
pub use transpiler::{ConditionsAndSorting, PostgresTranspiler, UnknownFieldPolicy};
pub use value::{ID_PLACEHOLDER, escape, quote, serialize};
