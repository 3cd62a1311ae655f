//! Key-case normalization.
//!
//! Relational columns are snake_case while callers usually write camelCase.
//! Normalization runs once over a whole query, nested documents included, so
//! the compilers only ever see column-shaped names.

use heck::ToSnakeCase;

use crate::query::Uql;
use crate::value::{Document, Value};

/// Converts a field reference to snake_case, one dot-separated segment at a time.
///
/// Only case boundaries gain underscores. Punctuation and leading or trailing
/// underscores are kept as written.
///
/// # Examples
///
/// ```
/// use uql_core::snake_key;
///
/// assert_eq!(snake_key("lastName"), "last_name");
/// assert_eq!(snake_key("job.companyName"), "job.company_name");
/// assert_eq!(snake_key("created_at"), "created_at");
/// assert_eq!(snake_key("e-mail"), "e-mail");
/// ```
pub fn snake_key(key: &str) -> String {
    key.split('.').map(snake_segment).collect::<Vec<_>>().join(".")
}

fn snake_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len() + 4);
    let mut rest = segment;
    while let Some(start) = rest.find(is_word_char) {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        let end = rest.find(|c: char| !is_word_char(c)).unwrap_or(rest.len());
        out.push_str(&snake_word(&rest[..end]));
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// heck drops surrounding underscores; put them back.
fn snake_word(word: &str) -> String {
    let core = word.trim_matches('_');
    if core.is_empty() {
        return word.to_string();
    }
    let leading = &word[..word.len() - word.trim_start_matches('_').len()];
    let trailing = &word[word.trim_end_matches('_').len()..];
    format!("{leading}{}{trailing}", core.to_snake_case())
}

/// Returns a copy of `doc` with every key, at every depth, in snake_case.
pub fn snake_document(doc: &Document) -> Document {
    doc.iter()
        .map(|(key, value)| (snake_key(key), snake_value(value)))
        .collect()
}

fn snake_value(value: &Value) -> Value {
    match value {
        Value::Object(doc) => Value::Object(snake_document(doc)),
        Value::Array(items) => Value::Array(items.iter().map(snake_value).collect()),
        other => other.clone(),
    }
}

impl Uql {
    /// Returns a copy with every key of `where` and `order` in snake_case.
    pub fn snake_cased(&self) -> Uql {
        Uql {
            where_: self.where_.as_ref().map(snake_document),
            order: self.order.as_ref().map(|order| order.map_fields(snake_key)),
        }
    }
}
