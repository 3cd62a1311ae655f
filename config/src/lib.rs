//! Model files for universal query transpilers.
//!
//! Table definitions and compilation options live in a YAML or JSON file
//! that [`ModelConfig`] loads, validates and turns into a [`uql_core::Model`].
//!
//! # Quick start
//!
//! ```no_run
//! use uql_config::ModelConfig;
//! use uql_postgres::PostgresTranspiler;
//!
//! let config = ModelConfig::load("model.yml").unwrap();
//! let model = config.build().unwrap();
//! let transpiler = PostgresTranspiler::new(&model).with_unknown_fields(config.unknown_fields());
//! ```

mod error;
mod model;

pub use error::{ConfigError, Result};
pub use model::{ModelConfig, ModelOptions, TableConfig};
