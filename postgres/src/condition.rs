//! `where` tree compilation.
//!
//! Every key of a condition document is classified exactly once into a
//! [`Condition`] node, then rendered. Classification needs the schema
//! (a `json` field turns an object value into a literal instead of a range
//! map); rendering needs it again to qualify column references.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use uql_core::{FieldType, Model, TableSchema, Value};
//! use uql_postgres::{ConditionCompiler, UnknownFieldPolicy};
//!
//! let table = TableSchema::from_fields(
//!     "people",
//!     [("name", FieldType::String), ("age", FieldType::Integer)],
//! )
//! .unwrap();
//! let model = Model::single(table);
//! let compiler = ConditionCompiler::new(&model, UnknownFieldPolicy::Reject);
//!
//! let where_ = Value::from(json!({"name": "Jon", "age": {"gte": 18, "lt": 65}}))
//!     .into_document()
//!     .unwrap();
//! assert_eq!(
//!     compiler.compile(Some(&where_)).unwrap(),
//!     " WHERE name='Jon' AND age >= 18 AND age < 65"
//! );
//! ```

use tracing::{debug, warn};
use uql_core::{
    BooleanOperator, ComparisonOperator, Document, FieldType, SchemaLookup, Value, root_field,
};

use crate::error::{Result, TranspileError};
use crate::transpiler::UnknownFieldPolicy;
use crate::value::{quote, serialize, text_of};

const AND: &str = " AND ";
const OR: &str = " OR ";

/// A classified condition-tree entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition<'q> {
    /// `column=literal`
    Equality {
        field: &'q str,
        ty: FieldType,
        value: &'q Value,
    },
    /// `column OP literal`, one per bound, ANDed.
    Range {
        field: &'q str,
        ty: FieldType,
        bounds: Vec<(ComparisonOperator, &'q Value)>,
    },
    /// Sub-documents expanded and flattened under one operator.
    Boolean {
        op: BooleanOperator,
        groups: Vec<Vec<Condition<'q>>>,
    },
    /// `column->'a'->>'key'='text'` into a JSON column.
    JsonPath {
        root: &'q str,
        path: Vec<&'q str>,
        value: &'q Value,
    },
    /// `column::jsonb @> 'json'::jsonb` on a whole JSON column.
    JsonContainment { field: &'q str, value: &'q Value },
}

/// Rendered SQL plus the loosest operator joining its top level.
///
/// Used to add parentheses only where operator precedence would otherwise
/// change the meaning.
#[derive(Debug)]
struct Fragment {
    sql: String,
    joined_by: BooleanOperator,
}

impl Fragment {
    fn atom(sql: String) -> Self {
        Self {
            sql,
            joined_by: BooleanOperator::And,
        }
    }
}

/// SQL operator for a comparison key.
pub fn comparison_sql(op: ComparisonOperator) -> &'static str {
    match op {
        ComparisonOperator::Gt => ">",
        ComparisonOperator::Gte => ">=",
        ComparisonOperator::Lt => "<",
        ComparisonOperator::Lte => "<=",
    }
}

fn separator(op: BooleanOperator) -> &'static str {
    match op {
        BooleanOperator::And => AND,
        BooleanOperator::Or => OR,
    }
}

/// Compiles condition documents against a schema.
pub struct ConditionCompiler<'s, S: SchemaLookup + ?Sized> {
    schema: &'s S,
    unknown_fields: UnknownFieldPolicy,
}

impl<'s, S: SchemaLookup + ?Sized> ConditionCompiler<'s, S> {
    pub fn new(schema: &'s S, unknown_fields: UnknownFieldPolicy) -> Self {
        Self {
            schema,
            unknown_fields,
        }
    }

    /// Compiles a `where` document into `" WHERE ..."`.
    ///
    /// Returns an empty string for an absent or empty document, or when every
    /// condition was dropped.
    pub fn compile(&self, where_: Option<&Document>) -> Result<String> {
        let Some(doc) = where_ else {
            return Ok(String::new());
        };
        let conditions = self.build_conditions(doc)?;
        if conditions.is_empty() {
            return Ok(String::new());
        }
        debug!(conditions = %conditions, "compiled where clause");
        Ok(format!(" WHERE {conditions}"))
    }

    /// Compiles a condition document into a bare predicate, without `WHERE`.
    pub fn build_conditions(&self, doc: &Document) -> Result<String> {
        let conditions = self.classify_document(doc)?;
        Ok(self.render_all(&conditions, BooleanOperator::And).sql)
    }

    /// Classifies every key of `doc`, in key order.
    pub fn classify_document<'q>(&self, doc: &'q Document) -> Result<Vec<Condition<'q>>> {
        let mut conditions = Vec::with_capacity(doc.len());
        for (key, value) in doc {
            if let Some(condition) = self.classify(key, value)? {
                conditions.push(condition);
            }
        }
        Ok(conditions)
    }

    /// Classifies a single `key: value` entry.
    ///
    /// Returns `Ok(None)` when the entry names an unknown field and the
    /// policy is [`UnknownFieldPolicy::Drop`].
    pub fn classify<'q>(&self, key: &'q str, value: &'q Value) -> Result<Option<Condition<'q>>> {
        if let Some(op) = BooleanOperator::from_key(key) {
            return self.classify_boolean(op, value).map(Some);
        }

        if key.contains('.') {
            let mut segments = key.split('.');
            let root = segments.next().unwrap_or(key);
            if self.schema.field_type(root).is_none() {
                return self.unknown_field(key);
            }
            return Ok(Some(Condition::JsonPath {
                root,
                path: segments.collect(),
                value,
            }));
        }

        let Some(ty) = self.schema.field_type(key) else {
            return self.unknown_field(key);
        };

        if ty == FieldType::Json {
            return Ok(Some(Condition::JsonContainment { field: key, value }));
        }

        match value {
            Value::Object(ops) => {
                let mut bounds = Vec::with_capacity(ops.len());
                for (op, bound) in ops {
                    let op = ComparisonOperator::from_key(op).ok_or_else(|| {
                        TranspileError::UnknownOperator {
                            field: key.to_string(),
                            operator: op.clone(),
                        }
                    })?;
                    bounds.push((op, bound));
                }
                Ok(Some(Condition::Range {
                    field: key,
                    ty,
                    bounds,
                }))
            }
            _ => Ok(Some(Condition::Equality {
                field: key,
                ty,
                value,
            })),
        }
    }

    fn classify_boolean<'q>(
        &self,
        op: BooleanOperator,
        value: &'q Value,
    ) -> Result<Condition<'q>> {
        let invalid = || TranspileError::InvalidBooleanOperand(op.as_str().to_string());
        let Value::Array(items) = value else {
            return Err(invalid());
        };

        let mut groups = Vec::with_capacity(items.len());
        for item in items {
            let doc = item.as_document().ok_or_else(invalid)?;
            groups.push(self.classify_document(doc)?);
        }
        Ok(Condition::Boolean { op, groups })
    }

    fn unknown_field<'q>(&self, field: &str) -> Result<Option<Condition<'q>>> {
        match self.unknown_fields {
            UnknownFieldPolicy::Reject => Err(TranspileError::UnresolvableField(field.to_string())),
            UnknownFieldPolicy::Drop => {
                warn!(field, "dropping condition on unknown field");
                Ok(None)
            }
        }
    }

    /// Column reference for a root field, qualified when the schema asks for it.
    pub(crate) fn column(&self, field: &str) -> String {
        let root = root_field(field);
        match self.schema.collection_for_field(root) {
            Some(table) if self.schema.qualifies_columns() => format!("{table}.{root}"),
            _ => root.to_string(),
        }
    }

    /// `column->'a'->>'b'` for a dotted reference.
    ///
    /// Inner segments stay `jsonb` through `->`; only the last one is read as
    /// text with `->>`.
    pub(crate) fn json_path<'p>(&self, root: &str, path: impl IntoIterator<Item = &'p str>) -> String {
        let mut sql = self.column(root);
        let mut segments = path.into_iter().peekable();
        while let Some(segment) = segments.next() {
            sql.push_str(if segments.peek().is_some() { "->" } else { "->>" });
            sql.push_str(&quote(segment));
        }
        sql
    }

    fn render_all(&self, conditions: &[Condition<'_>], op: BooleanOperator) -> Fragment {
        let fragments = conditions.iter().map(|c| self.render(c)).collect();
        join(fragments, op)
    }

    fn render(&self, condition: &Condition<'_>) -> Fragment {
        match condition {
            Condition::Equality { field, ty, value } => Fragment::atom(format!(
                "{}={}",
                self.column(field),
                serialize(*ty, value)
            )),
            Condition::Range { field, ty, bounds } => {
                let column = self.column(field);
                let parts = bounds
                    .iter()
                    .map(|(op, bound)| {
                        Fragment::atom(format!(
                            "{column} {} {}",
                            comparison_sql(*op),
                            serialize(*ty, bound)
                        ))
                    })
                    .collect();
                join(parts, BooleanOperator::And)
            }
            Condition::Boolean { op, groups } => {
                let fragments = groups
                    .iter()
                    .flat_map(|group| group.iter().map(|c| self.render(c)))
                    .collect();
                join(fragments, *op)
            }
            Condition::JsonPath { root, path, value } => Fragment::atom(format!(
                "{}={}",
                self.json_path(root, path.iter().copied()),
                quote(&text_of(value))
            )),
            Condition::JsonContainment { field, value } => Fragment::atom(format!(
                "{}::jsonb @> {}::jsonb",
                self.column(field),
                serialize(FieldType::Json, value)
            )),
        }
    }
}

/// Joins fragments with `op`, dropping empty ones.
///
/// An `OR` group placed among `AND` siblings is parenthesized.
fn join(fragments: Vec<Fragment>, op: BooleanOperator) -> Fragment {
    let mut fragments: Vec<Fragment> = fragments
        .into_iter()
        .filter(|fragment| !fragment.sql.is_empty())
        .collect();

    match fragments.len() {
        0 => Fragment::atom(String::new()),
        1 => fragments.remove(0),
        _ => {
            let sql = fragments
                .into_iter()
                .map(|fragment| {
                    if op == BooleanOperator::And && fragment.joined_by == BooleanOperator::Or {
                        format!("({})", fragment.sql)
                    } else {
                        fragment.sql
                    }
                })
                .collect::<Vec<_>>()
                .join(separator(op));
            Fragment { sql, joined_by: op }
        }
    }
}
