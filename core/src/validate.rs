//! Schema definition validation.
//!
//! Definitions are checked once, when a table or model is built, so bad
//! type names never reach query time.
//!
//! # Examples
//!
//! ```
//! use indexmap::IndexMap;
//! use uql_core::*;
//!
//! let mut def = IndexMap::new();
//! def.insert("name".to_string(), "string".to_string());
//! assert!(validate_definition("people", &def).is_empty());
//!
//! def.insert("age".to_string(), "int".to_string());
//! let errors = validate_definition("people", &def);
//! assert!(matches!(errors[0], SchemaError::UnknownType { .. }));
//! ```

use std::collections::HashSet;

use indexmap::IndexMap;
use thiserror::Error;

use crate::case::snake_key;
use crate::schema::TableSchema;
use crate::types::FieldType;

/// Schema definition errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The table was defined without any fields.
    #[error("schema definition is missing for table: {0}")]
    MissingDefinition(String),
    /// Table name is empty or whitespace-only.
    #[error("table name cannot be empty")]
    EmptyTableName,
    /// A field name is empty or whitespace-only.
    #[error("empty field name in table: {0}")]
    EmptyFieldName(String),
    /// A declared type is not part of the type catalog.
    #[error("{ty} is not a known schema type (field: {field})")]
    UnknownType { field: String, ty: String },
    /// Two fields map to the same column once normalized to snake_case.
    #[error("duplicate field in table: {0}")]
    DuplicateField(String),
    /// Two tables in the same model share a name.
    #[error("duplicate table in model: {0}")]
    DuplicateTable(String),
    /// A model must contain at least one table.
    #[error("model must define at least one table")]
    EmptyModel,
}

/// Validates a raw `field -> type name` definition for `table`.
///
/// Stops at the first problem, like the rest of the validators.
pub fn validate_definition(table: &str, definition: &IndexMap<String, String>) -> Vec<SchemaError> {
    let mut errors = Vec::new();

    if table.trim().is_empty() {
        errors.push(SchemaError::EmptyTableName);
        return errors;
    }

    if definition.is_empty() {
        errors.push(SchemaError::MissingDefinition(table.to_string()));
        return errors;
    }

    let mut seen: HashSet<String> = HashSet::new();
    for (field, ty) in definition {
        if field.trim().is_empty() {
            errors.push(SchemaError::EmptyFieldName(table.to_string()));
            return errors;
        }

        if ty.parse::<FieldType>().is_err() {
            errors.push(SchemaError::UnknownType {
                field: field.clone(),
                ty: ty.clone(),
            });
            return errors;
        }

        let column = snake_key(field);
        if !seen.insert(column.clone()) {
            errors.push(SchemaError::DuplicateField(column));
            return errors;
        }
    }

    errors
}

/// Validates the table set of a model.
pub fn validate_model(tables: &[TableSchema]) -> Vec<SchemaError> {
    let mut errors = Vec::new();

    if tables.is_empty() {
        errors.push(SchemaError::EmptyModel);
        return errors;
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for table in tables {
        if !seen.insert(table.name()) {
            errors.push(SchemaError::DuplicateTable(table.name().to_string()));
            return errors;
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(f, t)| (f.to_string(), t.to_string()))
            .collect()
    }

    #[test]
    fn test_validate_definition_accepts_every_catalog_type() {
        let def: IndexMap<String, String> = FieldType::ALL
            .iter()
            .map(|ty| (format!("{ty}_field"), ty.to_string()))
            .collect();
        assert!(validate_definition("everything", &def).is_empty());
    }

    #[test]
    fn test_validate_definition_names_the_bad_type() {
        let def = definition(&[("name", "string"), ("age", "number")]);
        let errors = validate_definition("people", &def);
        assert_eq!(
            errors,
            vec![SchemaError::UnknownType {
                field: "age".to_string(),
                ty: "number".to_string(),
            }]
        );
        assert_eq!(
            errors[0].to_string(),
            "number is not a known schema type (field: age)"
        );
    }

    #[test]
    fn test_validate_definition_rejects_missing_definition() {
        let errors = validate_definition("people", &IndexMap::new());
        assert_eq!(
            errors,
            vec![SchemaError::MissingDefinition("people".to_string())]
        );
    }

    #[test]
    fn test_validate_definition_rejects_case_collisions() {
        let def = definition(&[("lastName", "string"), ("last_name", "text")]);
        let errors = validate_definition("people", &def);
        assert_eq!(
            errors,
            vec![SchemaError::DuplicateField("last_name".to_string())]
        );
    }

    #[test]
    fn test_validate_definition_rejects_blank_table() {
        let def = definition(&[("name", "string")]);
        assert_eq!(
            validate_definition("  ", &def),
            vec![SchemaError::EmptyTableName]
        );
    }

    #[test]
    fn test_validate_model_rejects_duplicate_tables() {
        let def = definition(&[("name", "string")]);
        let a = TableSchema::define("people", &def).unwrap();
        let b = TableSchema::define("people", &def).unwrap();
        assert_eq!(
            validate_model(&[a, b]),
            vec![SchemaError::DuplicateTable("people".to_string())]
        );
        assert_eq!(validate_model(&[]), vec![SchemaError::EmptyModel]);
    }
}
