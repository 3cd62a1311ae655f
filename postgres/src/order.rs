//! `ORDER BY` compilation.

use tracing::warn;
use uql_core::{OrderSpec, SchemaLookup, root_field};

use crate::condition::ConditionCompiler;
use crate::error::{Result, TranspileError};
use crate::transpiler::UnknownFieldPolicy;

/// Compiles order specifications against a schema.
pub struct OrderCompiler<'s, S: SchemaLookup + ?Sized> {
    schema: &'s S,
    unknown_fields: UnknownFieldPolicy,
}

impl<'s, S: SchemaLookup + ?Sized> OrderCompiler<'s, S> {
    pub fn new(schema: &'s S, unknown_fields: UnknownFieldPolicy) -> Self {
        Self {
            schema,
            unknown_fields,
        }
    }

    /// Compiles `order` into `" ORDER BY ..."`, keeping entry order.
    ///
    /// Returns an empty string for an absent or empty specification.
    pub fn compile(&self, order: Option<&OrderSpec>) -> Result<String> {
        let Some(order) = order else {
            return Ok(String::new());
        };

        let columns = ConditionCompiler::new(self.schema, self.unknown_fields);
        let mut entries = Vec::with_capacity(order.len());
        for entry in order {
            if self.schema.field_type(root_field(&entry.field)).is_none() {
                match self.unknown_fields {
                    UnknownFieldPolicy::Reject => {
                        return Err(TranspileError::UnresolvableField(entry.field.clone()));
                    }
                    UnknownFieldPolicy::Drop => {
                        warn!(field = %entry.field, "dropping order entry on unknown field");
                        continue;
                    }
                }
            }

            let column = match entry.field.split_once('.') {
                Some((root, path)) => columns.json_path(root, path.split('.')),
                None => columns.column(&entry.field),
            };
            entries.push(format!("{column} {}", entry.direction));
        }

        if entries.is_empty() {
            return Ok(String::new());
        }
        Ok(format!(" ORDER BY {}", entries.join(", ")))
    }
}
