//! Schema model.
//!
//! A [`TableSchema`] maps column names to [`FieldType`]s for one table. A
//! [`Model`] groups the tables a query may touch and answers the two
//! questions the compilers ask about every field: what is its type, and which
//! table owns it. Both are immutable once built and can be shared freely
//! between threads.
//!
//! # Examples
//!
//! ```
//! use indexmap::IndexMap;
//! use uql_core::*;
//!
//! let mut def = IndexMap::new();
//! def.insert("name".to_string(), "string".to_string());
//! def.insert("lastName".to_string(), "string".to_string());
//! def.insert("job".to_string(), "json".to_string());
//!
//! let model = Model::single(TableSchema::define("people", &def).unwrap());
//! assert_eq!(model.field_type("last_name"), Some(FieldType::String));
//! assert_eq!(model.collection_for_field("job"), Some("people"));
//! assert_eq!(model.field_type("lastName"), None);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::case::snake_key;
use crate::types::FieldType;
use crate::validate::{SchemaError, validate_definition, validate_model};
use crate::value::Document;

/// Primary key column used when a table does not name one.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Returns the part of a field reference before the first dot.
///
/// ```
/// assert_eq!(uql_core::root_field("job.title"), "job");
/// assert_eq!(uql_core::root_field("name"), "name");
/// ```
pub fn root_field(field: &str) -> &str {
    field.split_once('.').map_or(field, |(root, _)| root)
}

/// Lookups the condition and order compilers need from a schema.
pub trait SchemaLookup {
    /// Table that statements are issued against.
    fn table_name(&self) -> &str;

    /// Primary key column of [`table_name`](Self::table_name).
    fn primary_key(&self) -> &str;

    /// Declared type of a root field, `None` when the field is unknown.
    fn field_type(&self, field: &str) -> Option<FieldType>;

    /// Table owning a root field, `None` when the field is unknown.
    fn collection_for_field(&self, field: &str) -> Option<&str>;

    /// Whether column references are written as `table.column`.
    fn qualifies_columns(&self) -> bool;

    /// Type of a column statements may write, `None` when the target table
    /// does not declare it.
    fn writable_type(&self, field: &str) -> Option<FieldType> {
        self.field_type(field)
    }

    /// Keys of `data` naming writable columns, in data order.
    fn known_fields<'d>(&self, data: &'d Document) -> Vec<&'d str> {
        data.keys()
            .map(String::as_str)
            .filter(|field| self.writable_type(field).is_some())
            .collect()
    }
}

/// Field types of a single table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    name: String,
    primary_key: String,
    fields: IndexMap<String, FieldType>,
}

impl TableSchema {
    /// Builds a table from a `field -> type name` definition.
    ///
    /// Field names are normalized to snake_case.
    ///
    /// # Errors
    ///
    /// Fails on the first invalid entry; see [`validate_definition`].
    pub fn define(name: &str, definition: &IndexMap<String, String>) -> Result<Self, SchemaError> {
        if let Some(err) = validate_definition(name, definition).into_iter().next() {
            return Err(err);
        }

        let mut fields = IndexMap::with_capacity(definition.len());
        for (field, ty) in definition {
            fields.insert(snake_key(field), ty.parse()?);
        }

        Ok(Self {
            name: name.to_string(),
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
            fields,
        })
    }

    /// Builds a table from already-typed fields.
    pub fn from_fields<I, S>(name: &str, fields: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (S, FieldType)>,
        S: Into<String>,
    {
        let definition: IndexMap<String, String> = fields
            .into_iter()
            .map(|(field, ty)| (field.into(), ty.to_string()))
            .collect();
        Self::define(name, &definition)
    }

    /// Overrides the primary key column.
    pub fn with_primary_key(mut self, primary_key: &str) -> Self {
        self.primary_key = snake_key(primary_key);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn fields(&self) -> &IndexMap<String, FieldType> {
        &self.fields
    }

    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        self.fields.get(field).copied()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }
}

/// When column references carry their table name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Qualify {
    /// Qualify only when the model spans more than one table.
    #[default]
    Auto,
    Always,
    Never,
}

/// The set of tables a transpiler compiles queries against.
///
/// The first table is the statement target. Field lookups resolve to the
/// first table that declares the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    tables: Vec<TableSchema>,
    qualify: Qualify,
}

impl Model {
    /// Builds a model over one or more tables.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyModel`] or [`SchemaError::DuplicateTable`].
    pub fn new(tables: Vec<TableSchema>) -> Result<Self, SchemaError> {
        if let Some(err) = validate_model(&tables).into_iter().next() {
            return Err(err);
        }
        Ok(Self {
            tables,
            qualify: Qualify::default(),
        })
    }

    /// Builds a model over a single table.
    pub fn single(table: TableSchema) -> Self {
        Self {
            tables: vec![table],
            qualify: Qualify::default(),
        }
    }

    pub fn with_qualify(mut self, qualify: Qualify) -> Self {
        self.qualify = qualify;
        self
    }

    pub fn qualify(&self) -> Qualify {
        self.qualify
    }

    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|table| table.name() == name)
    }

    /// The statement target table.
    pub fn primary_table(&self) -> &TableSchema {
        &self.tables[0]
    }

    /// Returns a model targeting `name`, keeping the other tables for lookups.
    pub fn targeting(&self, name: &str) -> Option<Model> {
        let index = self.tables.iter().position(|table| table.name() == name)?;
        let mut tables = self.tables.clone();
        let target = tables.remove(index);
        tables.insert(0, target);
        Some(Model {
            tables,
            qualify: self.qualify,
        })
    }

    /// Table declaring `field`, if any.
    pub fn owner_of(&self, field: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|table| table.has_field(field))
    }
}

impl SchemaLookup for Model {
    fn table_name(&self) -> &str {
        self.primary_table().name()
    }

    fn primary_key(&self) -> &str {
        self.primary_table().primary_key()
    }

    fn field_type(&self, field: &str) -> Option<FieldType> {
        self.owner_of(field).and_then(|table| table.field_type(field))
    }

    fn collection_for_field(&self, field: &str) -> Option<&str> {
        self.owner_of(field).map(TableSchema::name)
    }

    fn writable_type(&self, field: &str) -> Option<FieldType> {
        self.primary_table().field_type(field)
    }

    fn qualifies_columns(&self) -> bool {
        match self.qualify {
            Qualify::Auto => self.tables.len() > 1,
            Qualify::Always => true,
            Qualify::Never => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> TableSchema {
        TableSchema::from_fields(
            "people",
            [
                ("name", FieldType::String),
                ("lastName", FieldType::String),
                ("job", FieldType::Json),
            ],
        )
        .unwrap()
    }

    fn jobs() -> TableSchema {
        TableSchema::from_fields(
            "jobs",
            [("title", FieldType::String), ("name", FieldType::Text)],
        )
        .unwrap()
    }

    #[test]
    fn test_define_normalizes_field_names() {
        let table = people();
        let names: Vec<&str> = table.fields().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["name", "last_name", "job"]);
        assert_eq!(table.primary_key(), DEFAULT_PRIMARY_KEY);
    }

    #[test]
    fn test_define_fails_fast_on_unknown_type() {
        let mut def = IndexMap::new();
        def.insert("age".to_string(), "bigint".to_string());
        let err = TableSchema::define("people", &def).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { ref ty, .. } if ty == "bigint"));
    }

    #[test]
    fn test_single_table_model_is_unqualified() {
        let model = Model::single(people());
        assert!(!model.qualifies_columns());
        assert!(model.with_qualify(Qualify::Always).qualifies_columns());
    }

    #[test]
    fn test_multi_table_model_resolves_owner_in_table_order() {
        let model = Model::new(vec![people(), jobs()]).unwrap();
        assert!(model.qualifies_columns());
        assert_eq!(model.collection_for_field("title"), Some("jobs"));
        assert_eq!(model.collection_for_field("name"), Some("people"));
        assert_eq!(model.field_type("name"), Some(FieldType::String));
        assert_eq!(model.collection_for_field("salary"), None);
        assert_eq!(model.table_name(), "people");
    }

    #[test]
    fn test_targeting_moves_table_to_front() {
        let model = Model::new(vec![people(), jobs()]).unwrap();
        let retargeted = model.targeting("jobs").unwrap();
        assert_eq!(retargeted.table_name(), "jobs");
        assert_eq!(retargeted.collection_for_field("name"), Some("jobs"));
        assert!(model.targeting("missing").is_none());
    }

    #[test]
    fn test_known_fields_keep_data_order() {
        let model = Model::single(people());
        let mut data = Document::new();
        data.insert("job".into(), "x".into());
        data.insert("salary".into(), 1.into());
        data.insert("name".into(), "Jon".into());
        assert_eq!(model.known_fields(&data), vec!["job", "name"]);
    }

    #[test]
    fn test_only_target_table_columns_are_writable() {
        let model = Model::new(vec![people(), jobs()]).unwrap();
        let mut data = Document::new();
        data.insert("title".into(), "Programmer".into());
        data.insert("name".into(), "Jon".into());
        assert_eq!(model.writable_type("title"), None);
        assert_eq!(model.known_fields(&data), vec!["name"]);
    }

    #[test]
    fn test_primary_key_override_is_normalized() {
        let table = people().with_primary_key("personId");
        assert_eq!(table.primary_key(), "person_id");
    }
}
