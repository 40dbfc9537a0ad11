//! Form schemas, field descriptors, and validation.
//!
//! A form schema is an ordered sequence of field descriptors. Order is
//! significant: it determines render order for clients. Field names must be
//! unique within one schema.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Supported field types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Number,
    Boolean,
    Select,
}

impl FieldType {
    /// Get the wire name for this field type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Select => "select",
        }
    }
}

/// A single field descriptor within a form schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name, unique within the schema.
    pub name: String,
    /// Field type. Defaults to text when omitted by the client.
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: FieldType,
    /// Whether a submission must provide a non-empty value.
    #[serde(default)]
    pub required: bool,
    /// Optional validation rule. Only `contains:<s>` rules are enforced;
    /// any other rule text is stored opaquely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Allowed values for `select` fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

fn default_field_type() -> FieldType {
    FieldType::Text
}

/// Validate a form schema at intake time.
///
/// Enforced invariants:
/// - schema is non-empty and within the size cap
/// - every field name is non-empty and within the length cap
/// - field names are unique within the schema
/// - `select` fields declare at least one option
pub fn validate_schema(schema: &[FieldDescriptor]) -> Result<()> {
    if schema.is_empty() {
        return Err(Error::InvalidSchema("schema must not be empty".to_string()));
    }
    if schema.len() > crate::MAX_SCHEMA_FIELDS {
        return Err(Error::InvalidSchema(format!(
            "schema has {} fields (max {})",
            schema.len(),
            crate::MAX_SCHEMA_FIELDS
        )));
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(schema.len());
    for field in schema {
        if field.name.is_empty() {
            return Err(Error::InvalidSchema(
                "field name must not be empty".to_string(),
            ));
        }
        if field.name.len() > crate::MAX_FIELD_NAME_LEN {
            return Err(Error::InvalidSchema(format!(
                "field name '{}' exceeds {} characters",
                field.name,
                crate::MAX_FIELD_NAME_LEN
            )));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate field name: {}",
                field.name
            )));
        }
        if field.field_type == FieldType::Select
            && field.options.as_ref().is_none_or(|o| o.is_empty())
        {
            return Err(Error::InvalidSchema(format!(
                "select field '{}' must declare options",
                field.name
            )));
        }
    }

    Ok(())
}

/// Validate submitted values against a form schema.
///
/// Value keys must be a subset of the schema field names; required fields
/// must be present and non-empty. Type checks are per [`FieldType`].
pub fn validate_values(
    schema: &[FieldDescriptor],
    values: &serde_json::Map<String, Value>,
) -> Result<()> {
    for key in values.keys() {
        if !schema.iter().any(|f| f.name == *key) {
            return Err(Error::UnknownField(key.clone()));
        }
    }

    for field in schema {
        let value = values.get(&field.name);
        match value {
            None | Some(Value::Null) => {
                if field.required {
                    return Err(Error::MissingRequiredField(field.name.clone()));
                }
            }
            Some(value) => validate_value(field, value)?,
        }
    }

    Ok(())
}

fn validate_value(field: &FieldDescriptor, value: &Value) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidFieldValue {
        field: field.name.clone(),
        reason: reason.to_string(),
    };

    match field.field_type {
        FieldType::Text | FieldType::Email => {
            let text = value.as_str().ok_or_else(|| invalid("expected a string"))?;
            if field.required && text.trim().is_empty() {
                return Err(Error::MissingRequiredField(field.name.clone()));
            }
            if field.field_type == FieldType::Email && !text.is_empty() && !text.contains('@') {
                return Err(invalid("not a valid email address"));
            }
            if let Some(rule) = &field.pattern
                && let Some(needle) = rule.strip_prefix("contains:")
                && !text.contains(needle)
            {
                return Err(invalid("value does not match the field pattern"));
            }
        }
        FieldType::Number => {
            // JSON numbers are always finite; string values must parse to a
            // finite float so "NaN" and "inf" never reach the store.
            let numeric = value.is_number()
                || value
                    .as_str()
                    .is_some_and(|s| s.parse::<f64>().is_ok_and(f64::is_finite));
            if !numeric {
                return Err(invalid("expected a number"));
            }
        }
        FieldType::Boolean => {
            if !value.is_boolean() {
                return Err(invalid("expected a boolean"));
            }
        }
        FieldType::Select => {
            let text = value.as_str().ok_or_else(|| invalid("expected a string"))?;
            let allowed = field
                .options
                .as_ref()
                .is_some_and(|opts| opts.iter().any(|o| o == text));
            if !allowed {
                return Err(invalid("value is not one of the declared options"));
            }
        }
    }

    Ok(())
}
