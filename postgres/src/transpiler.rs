//! Transpiler facade and statement assembly.
//!
//! [`PostgresTranspiler`] normalizes key casing once per call, runs the
//! condition and order compilers, and assembles the fragments into complete
//! statements. Values are inlined as escaped literals; the only deferred
//! value is the primary-key placeholder used by the `*_by_pk` statements.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use uql_core::{FieldType, Model, TableSchema, Uql};
//! use uql_postgres::PostgresTranspiler;
//!
//! let table = TableSchema::from_fields(
//!     "single_table",
//!     [
//!         ("name", FieldType::String),
//!         ("lastName", FieldType::String),
//!         ("age", FieldType::Integer),
//!     ],
//! )
//! .unwrap();
//! let model = Model::single(table);
//! let transpiler = PostgresTranspiler::new(&model);
//!
//! let uql: Uql = serde_json::from_value(json!({
//!     "where": {"or": [{"name": "Jon"}, {"lastName": "Doe"}]},
//!     "order": [{"age": "ASC"}, {"lastName": "DESC"}]
//! }))
//! .unwrap();
//!
//! assert_eq!(
//!     transpiler.select(&uql).unwrap(),
//!     "SELECT * FROM single_table WHERE name='Jon' OR last_name='Doe' ORDER BY age ASC, last_name DESC"
//! );
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uql_core::{Document, FieldType, Model, OrderSpec, SchemaLookup, Uql, Value, snake_document};

use crate::condition::ConditionCompiler;
use crate::error::Result;
use crate::order::OrderCompiler;
use crate::value::{ID_PLACEHOLDER, quote, serialize};

/// What to do with a condition or order entry naming an unknown field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Fail with [`TranspileError::UnresolvableField`](crate::TranspileError::UnresolvableField).
    #[default]
    Reject,
    /// Leave the entry out and log a warning.
    Drop,
}

/// The `WHERE` and `ORDER BY` fragments of one query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConditionsAndSorting {
    /// `" WHERE ..."` or empty.
    pub conditions: String,
    /// `" ORDER BY ..."` or empty.
    pub sorting: String,
}

/// Compiles universal queries into PostgreSQL statements for one schema.
pub struct PostgresTranspiler<'s, S: SchemaLookup + ?Sized = Model> {
    schema: &'s S,
    unknown_fields: UnknownFieldPolicy,
}

impl<'s, S: SchemaLookup + ?Sized> PostgresTranspiler<'s, S> {
    pub fn new(schema: &'s S) -> Self {
        Self {
            schema,
            unknown_fields: UnknownFieldPolicy::default(),
        }
    }

    pub fn with_unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.unknown_fields = policy;
        self
    }

    fn conditions(&self) -> ConditionCompiler<'s, S> {
        ConditionCompiler::new(self.schema, self.unknown_fields)
    }

    /// `" WHERE ..."` for an already-normalized condition document.
    pub fn build_query_conditions(&self, where_: Option<&Document>) -> Result<String> {
        self.conditions().compile(where_)
    }

    /// `" ORDER BY ..."` for an already-normalized order specification.
    pub fn build_order_conditions(&self, order: Option<&OrderSpec>) -> Result<String> {
        OrderCompiler::new(self.schema, self.unknown_fields).compile(order)
    }

    /// Bare predicate for a condition document, without the `WHERE` keyword.
    pub fn build_conditions(&self, doc: &Document) -> Result<String> {
        self.conditions().build_conditions(doc)
    }

    /// Normalizes key casing, then compiles `where` and `order`.
    pub fn build_conditions_and_sorting(&self, uql: &Uql) -> Result<ConditionsAndSorting> {
        let uql = uql.snake_cased();
        Ok(ConditionsAndSorting {
            conditions: self.build_query_conditions(uql.where_.as_ref())?,
            sorting: self.build_order_conditions(uql.order.as_ref())?,
        })
    }

    /// `" WHERE ..."` for statements that ignore `order`.
    fn where_clause(&self, uql: &Uql) -> Result<String> {
        let where_ = uql.where_.as_ref().map(snake_document);
        self.build_query_conditions(where_.as_ref())
    }

    /// `SELECT * FROM table [WHERE ...] [ORDER BY ...]`
    pub fn select(&self, uql: &Uql) -> Result<String> {
        let ConditionsAndSorting {
            conditions,
            sorting,
        } = self.build_conditions_and_sorting(uql)?;
        let sql = format!(
            "SELECT * FROM {}{conditions}{sorting}",
            self.schema.table_name()
        );
        debug!(sql = %sql, "compiled select");
        Ok(sql)
    }

    /// `SELECT COUNT(*) FROM table [WHERE ...]`
    pub fn count(&self, uql: &Uql) -> Result<String> {
        let conditions = self.where_clause(uql)?;
        Ok(format!(
            "SELECT COUNT(*) FROM {}{conditions}",
            self.schema.table_name()
        ))
    }

    /// `INSERT INTO table (columns) VALUES (literals)`
    ///
    /// Only fields known to the schema are written, in data order. Returns
    /// `None` when no known field is present.
    pub fn insert(&self, data: &Document) -> Result<Option<String>> {
        let data = snake_document(data);
        let mut columns = Vec::new();
        let mut values = Vec::new();
        for field in self.schema.known_fields(&data) {
            let Some(ty) = self.schema.writable_type(field) else {
                continue;
            };
            columns.push(field);
            values.push(serialize(ty, &data[field]));
        }

        if columns.is_empty() {
            return Ok(None);
        }
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.schema.table_name(),
            columns.join(", "),
            values.join(", ")
        );
        debug!(sql = %sql, "compiled insert");
        Ok(Some(sql))
    }

    /// `UPDATE table SET ... [WHERE ...]`
    ///
    /// The primary key is never assigned. A dotted key updates one attribute
    /// of a JSON column. Returns `None` when nothing is left to assign.
    pub fn update(&self, uql: &Uql, data: &Document) -> Result<Option<String>> {
        let Some(assignments) = self.assignments(data) else {
            return Ok(None);
        };
        let conditions = self.where_clause(uql)?;
        let sql = format!(
            "UPDATE {} SET {assignments}{conditions}",
            self.schema.table_name()
        );
        debug!(sql = %sql, "compiled update");
        Ok(Some(sql))
    }

    /// `UPDATE table SET ... WHERE pk={idPlaceHolder}`
    pub fn update_by_pk(&self, data: &Document) -> Result<Option<String>> {
        Ok(self.assignments(data).map(|assignments| {
            format!(
                "UPDATE {} SET {assignments}{}",
                self.schema.table_name(),
                self.pk_condition()
            )
        }))
    }

    /// `DELETE FROM table [WHERE ...]`
    pub fn remove(&self, uql: &Uql) -> Result<String> {
        let conditions = self.where_clause(uql)?;
        Ok(format!("DELETE FROM {}{conditions}", self.schema.table_name()))
    }

    /// `DELETE FROM table WHERE pk={idPlaceHolder}`
    pub fn remove_by_pk(&self) -> String {
        format!(
            "DELETE FROM {}{}",
            self.schema.table_name(),
            self.pk_condition()
        )
    }

    fn pk_condition(&self) -> String {
        let pk = self.schema.primary_key();
        let column = if self.schema.qualifies_columns() {
            format!("{}.{pk}", self.schema.table_name())
        } else {
            pk.to_string()
        };
        format!(" WHERE {column}={ID_PLACEHOLDER}")
    }

    /// `SET` list for `data`, or `None` when nothing is assignable.
    fn assignments(&self, data: &Document) -> Option<String> {
        let data = snake_document(data);
        let pk = self.schema.primary_key();

        let mut assignments: Vec<String> = Vec::new();
        // JSON attribute updates, grouped per column so each column is
        // assigned once.
        let mut json_updates: IndexMap<&str, Vec<(Vec<&str>, &Value)>> = IndexMap::new();

        for (key, value) in &data {
            if key == pk {
                continue;
            }
            match key.split_once('.') {
                Some((root, path)) => {
                    if self.schema.writable_type(root) == Some(FieldType::Json) {
                        json_updates
                            .entry(root)
                            .or_default()
                            .push((path.split('.').collect(), value));
                    }
                }
                None => {
                    if let Some(ty) = self.schema.writable_type(key) {
                        assignments.push(format!("{key}={}", serialize(ty, value)));
                    }
                }
            }
        }

        for (column, updates) in json_updates {
            let mut expr = format!("{column}::jsonb");
            for (path, value) in updates {
                let path = quote(&format!("{{{}}}", path.join(",")));
                let value = serialize(FieldType::Json, value);
                expr = format!("jsonb_set({expr}, {path}, {value}::jsonb)");
            }
            assignments.push(format!("{column}={expr}"));
        }

        if assignments.is_empty() {
            None
        } else {
            Some(assignments.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uql_core::{Qualify, TableSchema};

    use super::*;

    fn model() -> Model {
        Model::single(
            TableSchema::from_fields(
                "single_table",
                [
                    ("id", FieldType::Integer),
                    ("name", FieldType::String),
                    ("lastName", FieldType::String),
                    ("job", FieldType::Json),
                ],
            )
            .unwrap(),
        )
    }

    fn doc(json: serde_json::Value) -> Document {
        Value::from(json).into_document().unwrap()
    }

    #[test]
    fn test_build_conditions_and_sorting_normalizes_once() {
        let model = model();
        let transpiler = PostgresTranspiler::new(&model);
        let uql: Uql = serde_json::from_value(json!({
            "where": {"lastName": "Doe"},
            "order": {"lastName": "DESC"}
        }))
        .unwrap();
        assert_eq!(
            transpiler.build_conditions_and_sorting(&uql).unwrap(),
            ConditionsAndSorting {
                conditions: " WHERE last_name='Doe'".to_string(),
                sorting: " ORDER BY last_name DESC".to_string(),
            }
        );
    }

    #[test]
    fn test_build_query_conditions_expects_normalized_keys() {
        let model = model();
        let transpiler =
            PostgresTranspiler::new(&model).with_unknown_fields(UnknownFieldPolicy::Drop);
        let where_ = doc(json!({"lastName": "Doe"}));
        assert_eq!(transpiler.build_query_conditions(Some(&where_)).unwrap(), "");
    }

    #[test]
    fn test_update_skips_primary_key() {
        let model = model();
        let transpiler = PostgresTranspiler::new(&model);
        let sql = transpiler
            .update(&Uql::new(), &doc(json!({"id": 4, "name": "Jon"})))
            .unwrap();
        assert_eq!(sql.as_deref(), Some("UPDATE single_table SET name='Jon'"));
    }

    #[test]
    fn test_update_with_only_primary_key_is_nothing() {
        let model = model();
        let transpiler = PostgresTranspiler::new(&model);
        assert_eq!(transpiler.update(&Uql::new(), &doc(json!({"id": 4}))).unwrap(), None);
    }

    #[test]
    fn test_update_groups_json_attributes_per_column() {
        let model = model();
        let transpiler = PostgresTranspiler::new(&model);
        let data = doc(json!({"job.title": "Programmer", "name": "Jon", "job.companyName": "Vox"}));
        let sql = transpiler.update(&Uql::new(), &data).unwrap().unwrap();
        assert_eq!(
            sql,
            "UPDATE single_table SET name='Jon', \
             job=jsonb_set(jsonb_set(job::jsonb, '{title}', '\"Programmer\"'::jsonb), \
             '{company_name}', '\"Vox\"'::jsonb)"
        );
    }

    #[test]
    fn test_by_pk_statements_use_placeholder() {
        let model = model();
        let transpiler = PostgresTranspiler::new(&model);
        assert_eq!(
            transpiler.update_by_pk(&doc(json!({"name": "Jon"}))).unwrap().as_deref(),
            Some("UPDATE single_table SET name='Jon' WHERE id={idPlaceHolder}")
        );
        assert_eq!(
            transpiler.remove_by_pk(),
            "DELETE FROM single_table WHERE id={idPlaceHolder}"
        );
    }

    #[test]
    fn test_placeholder_in_where_is_not_quoted() {
        let model = model();
        let transpiler = PostgresTranspiler::new(&model);
        let uql = Uql::new().with_where(doc(json!({"id": ID_PLACEHOLDER})));
        assert_eq!(
            transpiler.remove(&uql).unwrap(),
            "DELETE FROM single_table WHERE id={idPlaceHolder}"
        );
    }

    #[test]
    fn test_qualified_pk_condition() {
        let model = model().with_qualify(Qualify::Always);
        let transpiler = PostgresTranspiler::new(&model);
        assert_eq!(
            transpiler.remove_by_pk(),
            "DELETE FROM single_table WHERE single_table.id={idPlaceHolder}"
        );
    }

    #[test]
    fn test_count_ignores_order() {
        let model = model();
        let transpiler = PostgresTranspiler::new(&model);
        let uql: Uql = serde_json::from_value(json!({
            "where": {"name": "Jon"},
            "order": [{"name": "ASC"}]
        }))
        .unwrap();
        assert_eq!(
            transpiler.count(&uql).unwrap(),
            "SELECT COUNT(*) FROM single_table WHERE name='Jon'"
        );
    }
}
