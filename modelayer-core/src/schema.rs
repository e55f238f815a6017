//! Declarative record schemas and their validator.
//!
//! A [`SchemaShape`] names the fields a record may carry, each with a
//! [`FieldType`] and a required flag. Models expose a [`SchemaValidator`]
//! built from their configuration; the abstraction layer itself never runs
//! it, that is left to adapters and callers.

use bson::Bson;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::adapter::RawRecord;
use crate::error::{OdmError, OdmResult};

/// The value type a schema field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    Array,
    Object,
    /// Accepts any value; only the required flag applies.
    Any,
}

impl FieldType {
    fn name(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Any => "any",
        }
    }
}

/// One field's schema entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl From<FieldType> for FieldSpec {
    fn from(field_type: FieldType) -> Self {
        FieldSpec::new(field_type)
    }
}

/// A set of field definitions, keyed by field name.
///
/// Serializes as a flat map, so a shape can be read straight from JSON:
///
/// ```ignore
/// let shape: SchemaShape = serde_json::from_value(json!({
///     "name": { "type": "string", "required": true },
///     "age": { "type": "integer" },
/// }))?;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaShape {
    #[serde(flatten)]
    fields: BTreeMap<String, FieldSpec>,
}

impl SchemaShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field. Accepts a bare [`FieldType`] or a full [`FieldSpec`].
    pub fn field(mut self, name: impl Into<String>, spec: impl Into<FieldSpec>) -> Self {
        self.fields.insert(name.into(), spec.into());
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Validates raw records against a [`SchemaShape`].
///
/// Fields the shape does not declare pass through untouched; a declared
/// field is checked for presence (when required) and value type. All
/// problems are collected into a single [`OdmError::Validation`].
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    shape: SchemaShape,
}

impl SchemaValidator {
    pub fn new(shape: SchemaShape) -> Self {
        Self { shape }
    }

    pub fn shape(&self) -> &SchemaShape {
        &self.shape
    }

    pub fn validate(&self, record: &RawRecord) -> OdmResult<()> {
        let mut problems = Vec::new();

        for (name, spec) in self.shape.fields() {
            match record.get(name) {
                None | Some(Bson::Null) => {
                    if spec.required {
                        problems.push(format!("Field '{name}' is required"));
                    }
                }
                Some(value) => {
                    if !type_matches(spec.field_type, value) {
                        problems.push(format!(
                            "Field '{name}' expected {}, got {}",
                            spec.field_type.name(),
                            bson_kind(value),
                        ));
                    }
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(OdmError::Validation(problems.join("; ")))
        }
    }
}

fn type_matches(expected: FieldType, value: &Bson) -> bool {
    match expected {
        FieldType::String => matches!(value, Bson::String(_)),
        FieldType::Integer => matches!(value, Bson::Int32(_) | Bson::Int64(_)),
        // Integer values widen to float.
        FieldType::Float => matches!(value, Bson::Double(_) | Bson::Int32(_) | Bson::Int64(_)),
        FieldType::Boolean => matches!(value, Bson::Boolean(_)),
        FieldType::Array => matches!(value, Bson::Array(_)),
        FieldType::Object => matches!(value, Bson::Document(_)),
        FieldType::Any => true,
    }
}

fn bson_kind(value: &Bson) -> &'static str {
    match value {
        Bson::String(_) => "string",
        Bson::Int32(_) | Bson::Int64(_) => "integer",
        Bson::Double(_) => "float",
        Bson::Boolean(_) => "boolean",
        Bson::Array(_) => "array",
        Bson::Document(_) => "object",
        Bson::Null => "null",
        _ => "other",
    }
}
