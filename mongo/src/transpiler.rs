//! Universal query to Mongo-style documents.
//!
//! The document target needs no schema: keys are kept exactly as given,
//! dotted keys are already native paths, and values keep their JSON shape.
//! Operator keys gain a `$` prefix and dates use the extended JSON form
//! `{"$date": "..."}`.

use serde::Serialize;
use serde_json::{Map, Value as Json, json};
use tracing::debug;
use uql_core::{
    BooleanOperator, ComparisonOperator, DEFAULT_PRIMARY_KEY, Direction, Document, OrderSpec, Uql,
    Value,
};

use crate::error::{MongoError, Result};

/// A document as sent to the driver.
pub type MongoDocument = Map<String, Json>;

/// Arguments of a `find` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MongoFind {
    pub query: MongoDocument,
    pub sort: MongoDocument,
}

/// Options of an update call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MongoUpdateOptions {
    pub multi: bool,
}

/// Arguments of an `update` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MongoUpdate {
    pub query: MongoDocument,
    pub update: MongoDocument,
    pub options: MongoUpdateOptions,
}

/// Translates universal queries into filter, sort and update documents.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use uql_core::Uql;
/// use uql_mongo::MongoTranspiler;
///
/// let transpiler = MongoTranspiler::new();
/// let uql: Uql = serde_json::from_value(json!({
///     "where": {"or": [{"name": "Jon"}, {"lastName": "Doe"}]},
///     "order": {"age": "ASC", "lastName": "DESC"}
/// }))
/// .unwrap();
///
/// let find = transpiler.select(&uql).unwrap();
/// assert_eq!(json!(find.query), json!({"$or": [{"name": "Jon"}, {"lastName": "Doe"}]}));
/// assert_eq!(json!(find.sort), json!({"age": 1, "lastName": -1}));
/// ```
#[derive(Debug, Clone)]
pub struct MongoTranspiler {
    primary_key: String,
}

impl Default for MongoTranspiler {
    fn default() -> Self {
        Self {
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
        }
    }
}

impl MongoTranspiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the key left out of `$set` documents.
    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Filter and sort documents for a `find`.
    pub fn select(&self, uql: &Uql) -> Result<MongoFind> {
        let find = MongoFind {
            query: self.filter(uql.where_.as_ref())?,
            sort: sort(uql.order.as_ref()),
        };
        debug!(query = ?find.query, sort = ?find.sort, "compiled find");
        Ok(find)
    }

    /// Filter document for a `count`.
    pub fn count(&self, uql: &Uql) -> Result<MongoDocument> {
        self.filter(uql.where_.as_ref())
    }

    /// Filter document for a `remove`.
    pub fn remove(&self, uql: &Uql) -> Result<MongoDocument> {
        self.filter(uql.where_.as_ref())
    }

    /// The document to insert, unchanged.
    pub fn insert(&self, data: &Document) -> MongoDocument {
        to_document(data)
    }

    /// Filter and `$set` documents for a multi-document update.
    ///
    /// The primary key is left out of `$set`. Returns `None` when nothing is
    /// left to set.
    pub fn update(&self, uql: &Uql, data: &Document) -> Result<Option<MongoUpdate>> {
        let set: MongoDocument = data
            .iter()
            .filter(|(key, _)| key.as_str() != self.primary_key)
            .map(|(key, value)| (key.clone(), Json::from(value.clone())))
            .collect();
        if set.is_empty() {
            return Ok(None);
        }

        let mut update = MongoDocument::new();
        update.insert("$set".to_string(), Json::Object(set));
        Ok(Some(MongoUpdate {
            query: self.filter(uql.where_.as_ref())?,
            update,
            options: MongoUpdateOptions { multi: true },
        }))
    }

    /// Translates a `where` document into a filter document.
    pub fn filter(&self, where_: Option<&Document>) -> Result<MongoDocument> {
        let Some(doc) = where_ else {
            return Ok(MongoDocument::new());
        };

        let mut filter = MongoDocument::with_capacity(doc.len());
        for (key, value) in doc {
            if let Some(op) = BooleanOperator::from_key(key) {
                filter.insert(format!("${}", op.as_str()), self.boolean(op, value)?);
            } else {
                filter.insert(key.clone(), condition_value(value));
            }
        }
        Ok(filter)
    }

    fn boolean(&self, op: BooleanOperator, value: &Value) -> Result<Json> {
        let invalid = || MongoError::InvalidBooleanOperand(op.as_str().to_string());
        let Value::Array(items) = value else {
            return Err(invalid());
        };

        let mut groups = Vec::with_capacity(items.len());
        for item in items {
            let doc = item.as_document().ok_or_else(invalid)?;
            groups.push(Json::Object(self.filter(Some(doc))?));
        }
        Ok(Json::Array(groups))
    }
}

/// A condition value: a range map gains `$` operators, anything else is
/// matched as-is.
fn condition_value(value: &Value) -> Json {
    match value {
        Value::Object(ops)
            if !ops.is_empty() && ops.keys().all(|op| ComparisonOperator::from_key(op).is_some()) =>
        {
            Json::Object(
                ops.iter()
                    .map(|(op, bound)| (format!("${op}"), Json::from(bound.clone())))
                    .collect(),
            )
        }
        other => Json::from(other.clone()),
    }
}

fn sort(order: Option<&OrderSpec>) -> MongoDocument {
    order
        .into_iter()
        .flatten()
        .map(|entry| {
            let direction = match entry.direction {
                Direction::Asc => json!(1),
                Direction::Desc => json!(-1),
            };
            (entry.field.clone(), direction)
        })
        .collect()
}

fn to_document(data: &Document) -> MongoDocument {
    data.iter()
        .map(|(key, value)| (key.clone(), Json::from(value.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(json: Json) -> Document {
        Value::from(json).into_document().unwrap()
    }

    #[test]
    fn test_range_map_gains_dollar_operators() {
        let filter = MongoTranspiler::new()
            .filter(Some(&doc(json!({"age": {"gte": 18, "lt": 65}}))))
            .unwrap();
        assert_eq!(Json::Object(filter), json!({"age": {"$gte": 18, "$lt": 65}}));
    }

    #[test]
    fn test_embedded_document_is_matched_as_is() {
        let filter = MongoTranspiler::new()
            .filter(Some(&doc(json!({"job": {"title": "Programmer"}}))))
            .unwrap();
        assert_eq!(Json::Object(filter), json!({"job": {"title": "Programmer"}}));
    }

    #[test]
    fn test_nested_boolean_operators() {
        let filter = MongoTranspiler::new()
            .filter(Some(&doc(json!({
                "or": [{"name": "Jon"}, {"and": [{"age": 1}, {"tracked": true}]}]
            }))))
            .unwrap();
        assert_eq!(
            Json::Object(filter),
            json!({"$or": [{"name": "Jon"}, {"$and": [{"age": 1}, {"tracked": true}]}]})
        );
    }

    #[test]
    fn test_boolean_operand_must_be_a_list_of_objects() {
        let err = MongoTranspiler::new()
            .filter(Some(&doc(json!({"and": {"name": "Jon"}}))))
            .unwrap_err();
        assert_eq!(err, MongoError::InvalidBooleanOperand("and".to_string()));
    }

    #[test]
    fn test_custom_primary_key_is_left_out_of_set() {
        let transpiler = MongoTranspiler::new().with_primary_key("_id");
        let update = transpiler
            .update(&Uql::new(), &doc(json!({"_id": "abc", "id": 1})))
            .unwrap()
            .unwrap();
        assert_eq!(Json::Object(update.update), json!({"$set": {"id": 1}}));
    }

    #[test]
    fn test_update_with_only_primary_key_is_nothing() {
        let transpiler = MongoTranspiler::new();
        assert_eq!(
            transpiler.update(&Uql::new(), &doc(json!({"id": 1}))).unwrap(),
            None
        );
    }
}
