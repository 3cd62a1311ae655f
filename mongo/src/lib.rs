//! Document-store target for universal queries.
//!
//! Translates [`Uql`](uql_core::Uql) queries into Mongo-style filter, sort
//! and update documents (as [`serde_json`] maps). Nothing here talks to a
//! server; the documents are handed to whatever driver the caller uses.
//!
//! # Quick start
//!
//! ```
//! use serde_json::json;
//! use uql_core::{Uql, Value};
//! use uql_mongo::MongoTranspiler;
//!
//! let transpiler = MongoTranspiler::new();
//! let query: Uql = serde_json::from_value(json!({"where": {"job.title": "Programmer"}})).unwrap();
//! let data = Value::from(json!({"id": "1", "name": "Jon"})).into_document().unwrap();
//!
//! let update = transpiler.update(&query, &data).unwrap().unwrap();
//! assert_eq!(
//!     json!(update),
//!     json!({
//!         "query": {"job.title": "Programmer"},
//!         "update": {"$set": {"name": "Jon"}},
//!         "options": {"multi": true}
//!     })
//! );
//! ```

mod error;
mod transpiler;

pub use error::{MongoError, Result};
pub use transpiler::{MongoDocument, MongoFind, MongoTranspiler, MongoUpdate, MongoUpdateOptions};
