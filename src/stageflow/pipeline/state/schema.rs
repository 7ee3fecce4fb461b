// SPDX-License-Identifier: MIT

//! State schema definitions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::adk::error::PipelineError;

/// Stage name used when the invocation input itself is rejected
pub const INPUT_STAGE: &str = "__input__";

/// Schema defining the record threaded through a sequence
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct StateSchema {
    /// Field definitions
    #[serde(flatten)]
    pub fields: BTreeMap<String, StateFieldDef>,
}

/// Definition of a single state field
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StateFieldDef {
    /// Type of the field
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the invocation input must provide the field
    #[serde(default)]
    pub required: bool,
    /// Default value seeded before the input is applied
    pub default: Option<Value>,
}

/// Supported field types
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl FieldType {
    pub fn matches(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Array => value.is_array(),
            FieldType::Object => value.is_object(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
        }
    }
}

/// JSON type name of a value, for error messages
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl StateSchema {
    /// Add a field definition (builder style)
    pub fn field(mut self, name: &str, field_type: FieldType, required: bool) -> Self {
        self.fields.insert(
            name.to_string(),
            StateFieldDef {
                field_type,
                required,
                default: None,
            },
        );
        self
    }

    /// Check an invocation input against the declared fields.
    ///
    /// Undeclared keys pass through untouched; `null` counts as absent.
    pub fn validate(&self, input: &Map<String, Value>) -> Result<(), PipelineError> {
        for (name, def) in &self.fields {
            match input.get(name) {
                None | Some(Value::Null) => {
                    if def.required {
                        return Err(PipelineError::invalid_input(
                            INPUT_STAGE,
                            name,
                            "is required",
                        ));
                    }
                }
                Some(value) if !def.field_type.matches(value) => {
                    return Err(PipelineError::invalid_input(
                        INPUT_STAGE,
                        name,
                        format!(
                            "must be a {}, got {}",
                            def.field_type.as_str(),
                            type_name(value)
                        ),
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
