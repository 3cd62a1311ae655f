//! Universal query (UQL) types.
//!
//! A [`Uql`] is what callers hand to a transpiler: an optional `where`
//! condition tree and an optional ordering. The condition tree stays a raw
//! [`Document`]; each backend classifies its keys according to its own
//! schema knowledge.
//!
//! # Examples
//!
//! ```
//! use uql_core::{Direction, Uql};
//!
//! let uql: Uql = serde_json::from_str(r#"{
//!     "where": {"or": [{"name": "Jon"}, {"lastName": "Doe"}]},
//!     "order": [{"age": "ASC"}, {"lastName": "DESC"}]
//! }"#).unwrap();
//!
//! let order = uql.order.unwrap();
//! assert_eq!(order.len(), 2);
//! assert_eq!(order.entries()[1].direction, Direction::Desc);
//! ```

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::Document;

/// Structural keys of a condition tree. They are never schema fields.
pub const BOOLEAN_OPERATORS: [BooleanOperator; 2] = [BooleanOperator::And, BooleanOperator::Or];

/// Comparison keys accepted inside a range map.
pub const COMPARISON_OPERATORS: [ComparisonOperator; 4] = [
    ComparisonOperator::Gt,
    ComparisonOperator::Gte,
    ComparisonOperator::Lt,
    ComparisonOperator::Lte,
];

/// A backend-agnostic query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Uql {
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub where_: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderSpec>,
}

impl Uql {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the condition tree.
    pub fn with_where(mut self, where_: Document) -> Self {
        self.where_ = Some(where_);
        self
    }

    /// Sets the ordering.
    pub fn with_order(mut self, order: OrderSpec) -> Self {
        self.order = Some(order);
        self
    }
}

/// `and` / `or`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOperator {
    And,
    Or,
}

impl BooleanOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            BooleanOperator::And => "and",
            BooleanOperator::Or => "or",
        }
    }

    /// Returns the operator for a condition-tree key, if the key is one.
    pub fn from_key(key: &str) -> Option<Self> {
        BOOLEAN_OPERATORS.into_iter().find(|op| op.as_str() == key)
    }
}

/// `gt`, `gte`, `lt`, `lte`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl ComparisonOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOperator::Gt => "gt",
            ComparisonOperator::Gte => "gte",
            ComparisonOperator::Lt => "lt",
            ComparisonOperator::Lte => "lte",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        COMPARISON_OPERATORS.into_iter().find(|op| op.as_str() == key)
    }
}

/// Sort direction of an order entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASC" | "asc" => Ok(Direction::Asc),
            "DESC" | "desc" => Ok(Direction::Desc),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}

/// One `{field: direction}` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Desc)
    }
}

/// An ordered list of sort entries.
///
/// Deserializes from either a list of single-key maps
/// (`[{"age": "ASC"}, {"lastName": "DESC"}]`) or a single map whose key order
/// is kept (`{"age": "ASC", "lastName": "DESC"}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawOrderSpec", into = "RawOrderSpec")]
pub struct OrderSpec(Vec<OrderBy>);

impl OrderSpec {
    pub fn new(entries: Vec<OrderBy>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[OrderBy] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OrderBy> {
        self.0.iter()
    }

    /// Returns a copy with every field name passed through `rename`.
    pub fn map_fields(&self, rename: impl Fn(&str) -> String) -> Self {
        Self(
            self.0
                .iter()
                .map(|entry| OrderBy::new(rename(&entry.field), entry.direction))
                .collect(),
        )
    }
}

impl FromIterator<OrderBy> for OrderSpec {
    fn from_iter<I: IntoIterator<Item = OrderBy>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a OrderSpec {
    type Item = &'a OrderBy;
    type IntoIter = std::slice::Iter<'a, OrderBy>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawOrderSpec {
    List(Vec<IndexMap<String, Direction>>),
    Map(IndexMap<String, Direction>),
}

impl From<RawOrderSpec> for OrderSpec {
    fn from(raw: RawOrderSpec) -> Self {
        match raw {
            RawOrderSpec::List(entries) => entries
                .into_iter()
                .flat_map(|entry| entry.into_iter())
                .map(|(field, direction)| OrderBy::new(field, direction))
                .collect(),
            RawOrderSpec::Map(entries) => entries
                .into_iter()
                .map(|(field, direction)| OrderBy::new(field, direction))
                .collect(),
        }
    }
}

impl From<OrderSpec> for RawOrderSpec {
    fn from(spec: OrderSpec) -> Self {
        RawOrderSpec::List(
            spec.0
                .into_iter()
                .map(|entry| IndexMap::from([(entry.field, entry.direction)]))
                .collect(),
        )
    }
}
