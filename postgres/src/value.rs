//! Type-directed literal encoding.
//!
//! Values are inlined into statements as literals, so every quoted string
//! goes through [`quote`]. The encoding is picked by the field's declared
//! [`FieldType`], never by the runtime shape of the value; a string that
//! looks numeric is still quoted for a `string` column and rejected (as
//! `null`) for an `integer` column.

use uql_core::{FieldType, Value, format_iso};

/// Marker for values bound by the caller after compilation.
///
/// Passed through verbatim for textual and integer fields.
pub const ID_PLACEHOLDER: &str = "{idPlaceHolder}";

const NULL: &str = "null";

/// Doubles every single quote.
///
/// ```
/// assert_eq!(uql_postgres::escape("O'Neil"), "O''Neil");
/// ```
pub fn escape(value: &str) -> String {
    value.replace('\'', "''")
}

/// Wraps `value` in single quotes after escaping it.
pub fn quote(value: &str) -> String {
    format!("'{}'", escape(value))
}

/// Encodes `value` as a SQL literal for a field of type `ty`.
///
/// Values that do not fit the type encode as `null`.
///
/// # Examples
///
/// ```
/// use uql_core::{FieldType, Value};
/// use uql_postgres::serialize;
///
/// assert_eq!(serialize(FieldType::String, &Value::from("Jon")), "'Jon'");
/// assert_eq!(serialize(FieldType::Integer, &Value::from(23)), "23");
/// assert_eq!(serialize(FieldType::Integer, &Value::from("23")), "null");
/// assert_eq!(serialize(FieldType::Boolean, &Value::from(0)), "false");
/// ```
pub fn serialize(ty: FieldType, value: &Value) -> String {
    match ty {
        FieldType::String | FieldType::Text | FieldType::Uuid => serialize_text(value),
        FieldType::Integer => serialize_integer(value),
        FieldType::Decimal => serialize_decimal(value),
        FieldType::Boolean => serialize_boolean(value),
        FieldType::Json => serialize_json(value),
        FieldType::Date => serialize_date(value),
    }
}

/// Renders a value the way it reads inside a quoted literal.
pub(crate) fn text_of(value: &Value) -> String {
    match value {
        Value::Null => NULL.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => s.clone(),
        Value::Date(date) => format_iso(date),
        Value::Array(_) | Value::Object(_) => value.to_plain_json().to_string(),
    }
}

fn is_placeholder(value: &Value) -> bool {
    value.as_str() == Some(ID_PLACEHOLDER)
}

fn serialize_text(value: &Value) -> String {
    if is_placeholder(value) {
        return ID_PLACEHOLDER.to_string();
    }
    if value.is_truthy() {
        quote(&text_of(value))
    } else {
        NULL.to_string()
    }
}

fn serialize_integer(value: &Value) -> String {
    if is_placeholder(value) {
        return ID_PLACEHOLDER.to_string();
    }
    match value {
        Value::Int(i) => i.to_string(),
        Value::Float(f) if f.is_finite() && f.fract() == 0.0 => format!("{f:.0}"),
        _ => NULL.to_string(),
    }
}

fn serialize_decimal(value: &Value) -> String {
    match value {
        Value::Int(i) => i.to_string(),
        Value::Float(f) if f.is_finite() => f.to_string(),
        _ => NULL.to_string(),
    }
}

fn serialize_boolean(value: &Value) -> String {
    value.is_truthy().to_string()
}

fn serialize_json(value: &Value) -> String {
    quote(&value.to_plain_json().to_string())
}

fn serialize_date(value: &Value) -> String {
    value
        .as_date()
        .map_or_else(|| NULL.to_string(), |date| quote(&format_iso(&date)))
}
