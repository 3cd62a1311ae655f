//! Model files describing the tables a transpiler compiles against.
//!
//! A model file lists tables with their field types plus the options that
//! shape compilation. YAML and JSON are both accepted; the format follows the
//! file extension.
//!
//! # Example YAML
//!
//! ```yaml
//! tables:
//!   - name: people
//!     fields:
//!       name: string
//!       lastName: string
//!       age: integer
//!       job: json
//!   - name: companies
//!     primary_key: company_id
//!     fields:
//!       companyName: string
//! options:
//!   qualify: auto
//!   unknown_fields: reject
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uql_core::{DEFAULT_PRIMARY_KEY, Model, Qualify, SchemaError, TableSchema};
use uql_core::{validate_definition, validate_model};
use uql_postgres::UnknownFieldPolicy;

use crate::error::{ConfigError, Result};

/// One table of a model file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Table (or collection) name.
    pub name: String,
    /// Primary key column, `id` when omitted.
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    /// Field name to type name, in declaration order.
    #[serde(default)]
    pub fields: IndexMap<String, String>,
}

fn default_primary_key() -> String {
    DEFAULT_PRIMARY_KEY.to_string()
}

impl TableConfig {
    fn build(&self) -> std::result::Result<TableSchema, SchemaError> {
        Ok(TableSchema::define(&self.name, &self.fields)?.with_primary_key(&self.primary_key))
    }
}

/// Compilation options carried by a model file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelOptions {
    /// When column references carry their table name.
    pub qualify: Qualify,
    /// What to do with conditions on undeclared fields.
    pub unknown_fields: UnknownFieldPolicy,
}

/// A model file.
///
/// # Examples
///
/// ```
/// use uql_config::ModelConfig;
/// use uql_core::{FieldType, SchemaLookup};
///
/// let config = ModelConfig::from_yaml_str(
///     "tables:\n  - name: people\n    fields:\n      lastName: string\n",
/// )
/// .unwrap();
/// let model = config.build().unwrap();
/// assert_eq!(model.field_type("last_name"), Some(FieldType::String));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub tables: Vec<TableConfig>,
    #[serde(default)]
    pub options: ModelOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

impl Format {
    fn of(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yml" | "yaml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedExtension(
                path.display().to_string(),
            )),
        }
    }
}

impl ModelConfig {
    /// Loads a model file, YAML or JSON by extension.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedExtension`](ConfigError::UnsupportedExtension)
    /// for other extensions, [`IoError`](ConfigError::IoError) if the file
    /// cannot be read, or a parse error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = Format::of(path)?;
        let reader = BufReader::new(std::fs::File::open(path)?);
        let config: Self = match format {
            Format::Yaml => serde_yaml::from_reader(reader)?,
            Format::Json => serde_json::from_reader(reader)?,
        };
        debug!(path = %path.display(), tables = config.tables.len(), "loaded model file");
        Ok(config)
    }

    /// Saves the model file, YAML or JSON by extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = Format::of(path)?;
        let writer = BufWriter::new(std::fs::File::create(path)?);
        match format {
            Format::Yaml => serde_yaml::to_writer(writer, self)?,
            Format::Json => serde_json::to_writer_pretty(writer, self)?,
        }
        Ok(())
    }

    /// Parses a YAML model.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Every schema problem in the file, in table order.
    ///
    /// Table-level checks (empty model, duplicate tables) only run once every
    /// table definition is valid on its own.
    pub fn validate(&self) -> Vec<SchemaError> {
        let errors: Vec<SchemaError> = self
            .tables
            .iter()
            .flat_map(|table| validate_definition(&table.name, &table.fields))
            .collect();
        if !errors.is_empty() {
            return errors;
        }

        let tables: std::result::Result<Vec<TableSchema>, SchemaError> =
            self.tables.iter().map(TableConfig::build).collect();
        match tables {
            Ok(tables) => validate_model(&tables),
            Err(err) => vec![err],
        }
    }

    /// Builds the [`Model`] the transpilers compile against.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`](ConfigError::SchemaError) for the first
    /// invalid table or a model that is empty or repeats a table.
    pub fn build(&self) -> Result<Model> {
        let tables = self
            .tables
            .iter()
            .map(TableConfig::build)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Model::new(tables)?.with_qualify(self.options.qualify))
    }

    /// Policy for conditions on undeclared fields.
    pub fn unknown_fields(&self) -> UnknownFieldPolicy {
        self.options.unknown_fields
    }
}
