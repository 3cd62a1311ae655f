//! The field type catalog.
//!
//! Every schema field carries one of a fixed set of [`FieldType`] tags. The
//! tag drives how a value is encoded for a backend, so the set is closed:
//! adding a tag here forces every backend serializer to handle it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validate::SchemaError;

/// Declared semantic type of a schema field.
///
/// Type names are lowercase in model definitions (`string`, `integer`, ...).
///
/// # Examples
///
/// ```
/// use uql_core::FieldType;
///
/// let ty: FieldType = "integer".parse().unwrap();
/// assert_eq!(ty, FieldType::Integer);
/// assert_eq!(ty.to_string(), "integer");
/// assert!("varchar".parse::<FieldType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Short character data.
    String,
    /// Long character data.
    Text,
    /// Whole numbers.
    Integer,
    /// Arbitrary numbers.
    Decimal,
    /// `true` / `false`.
    Boolean,
    /// Instants in time.
    Date,
    /// Structured documents stored in a single column.
    Json,
    /// UUID strings.
    Uuid,
}

impl FieldType {
    /// Every recognized type, in catalog order.
    pub const ALL: [FieldType; 8] = [
        FieldType::String,
        FieldType::Text,
        FieldType::Integer,
        FieldType::Decimal,
        FieldType::Boolean,
        FieldType::Date,
        FieldType::Json,
        FieldType::Uuid,
    ];

    /// Returns the lowercase type name used in model definitions.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Decimal => "decimal",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Json => "json",
            FieldType::Uuid => "uuid",
        }
    }

    /// Returns `true` for the character-data types that are quoted verbatim.
    pub fn is_textual(self) -> bool {
        matches!(self, FieldType::String | FieldType::Text | FieldType::Uuid)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| SchemaError::UnknownType {
                field: String::new(),
                ty: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_catalog_name_parses_back() {
        for ty in FieldType::ALL {
            assert_eq!(ty.as_str().parse::<FieldType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_type_names_are_case_sensitive() {
        assert!("String".parse::<FieldType>().is_err());
        assert!("JSON".parse::<FieldType>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&FieldType::Decimal).unwrap();
        assert_eq!(json, "\"decimal\"");
        let ty: FieldType = serde_json::from_str("\"uuid\"").unwrap();
        assert_eq!(ty, FieldType::Uuid);
    }

    #[test]
    fn test_textual_types() {
        assert!(FieldType::Uuid.is_textual());
        assert!(FieldType::Text.is_textual());
        assert!(!FieldType::Json.is_textual());
        assert!(!FieldType::Date.is_textual());
    }
}
