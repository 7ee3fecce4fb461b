// SPDX-License-Identifier: MIT

//! Runtime record threaded through a sequence

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::schema::{type_name, StateSchema};
use crate::adk::error::PipelineError;

/// Partial update returned by a stage
pub type StateUpdate = Map<String, Value>;

/// Runtime workflow state.
///
/// Keys are kept sorted so two runs over the same input serialize
/// identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WorkflowState {
    fields: Map<String, Value>,
}

impl WorkflowState {
    /// Create a WorkflowState seeded with the schema defaults
    pub fn new(schema: &StateSchema) -> Self {
        let fields = schema
            .fields
            .iter()
            .filter_map(|(name, def)| def.default.clone().map(|v| (name.clone(), v)))
            .collect();
        Self { fields }
    }

    /// Create a state from schema defaults overlaid with the caller's input
    pub fn from_input(schema: &StateSchema, input: Map<String, Value>) -> Self {
        let mut state = Self::new(schema);
        state.merge(input);
        state
    }

    /// Merge a partial update: keys in the update overwrite, the rest stay
    pub fn merge(&mut self, update: StateUpdate) {
        for (key, value) in update {
            self.fields.insert(key, value);
        }
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Get a field a stage depends on; absent or `null` is an input error
    pub fn require(&self, stage: &str, key: &str) -> Result<&Value, PipelineError> {
        match self.fields.get(key) {
            Some(Value::Null) | None => Err(PipelineError::invalid_input(
                stage,
                key,
                "is missing (has an earlier stage run?)",
            )),
            Some(value) => Ok(value),
        }
    }

    /// Get a string field a stage depends on
    pub fn require_str(&self, stage: &str, key: &str) -> Result<&str, PipelineError> {
        let value = self.require(stage, key)?;
        value.as_str().ok_or_else(|| {
            PipelineError::invalid_input(
                stage,
                key,
                format!("must be a string, got {}", type_name(value)),
            )
        })
    }

    /// Deserialize a structured field a stage depends on
    pub fn require_as<T: DeserializeOwned>(
        &self,
        stage: &str,
        key: &str,
    ) -> Result<T, PipelineError> {
        let value = self.require(stage, key)?;
        T::deserialize(value)
            .map_err(|e| PipelineError::invalid_input(stage, key, format!("is malformed: {}", e)))
    }

    /// Convert state to JSON object
    pub fn to_json(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// Consume the state into a JSON object
    pub fn into_json(self) -> Value {
        Value::Object(self.fields)
    }

    /// Get all field names
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stageflow::pipeline::state::schema::{FieldType, StateFieldDef};
    use serde_json::json;

    fn update(value: Value) -> StateUpdate {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_empty_state() {
        let state = WorkflowState::default();
        assert!(state.get("anything").is_none());
        assert!(state.is_empty());
    }

    #[test]
    fn test_state_with_defaults() {
        let mut schema = StateSchema::default();
        schema.fields.insert(
            "count".to_string(),
            StateFieldDef {
                field_type: FieldType::Number,
                required: false,
                default: Some(json!(0)),
            },
        );
        let state = WorkflowState::new(&schema);
        assert_eq!(state.get("count"), Some(&json!(0)));

        let state = WorkflowState::from_input(&schema, update(json!({"count": 3})));
        assert_eq!(state.get("count"), Some(&json!(3)));
    }

    #[test]
    fn test_merge_is_non_destructive() {
        let mut state = WorkflowState::default();
        state.merge(update(json!({"text": "Hello", "a": 1})));
        state.merge(update(json!({"b": 2})));
        state.merge(update(json!({"a": 10})));

        assert_eq!(state.to_json(), json!({"text": "Hello", "a": 10, "b": 2}));
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn test_require_missing_field() {
        let state = WorkflowState::default();
        let err = state.require("summarize", "preprocessed_text").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidInput { ref stage, ref field, .. }
                if stage == "summarize" && field == "preprocessed_text"
        ));
    }

    #[test]
    fn test_require_str_wrong_type() {
        let mut state = WorkflowState::default();
        state.merge(update(json!({"text": ["not", "a", "string"]})));
        let err = state.require_str("preprocess", "text").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid input to stage 'preprocess': field 'text' must be a string, got array"
        );
    }

    #[test]
    fn test_require_as_structured() {
        let mut state = WorkflowState::default();
        state.merge(update(json!({"nums": [1, 2, 3], "bad": "x"})));

        let nums: Vec<u32> = state.require_as("sum", "nums").unwrap();
        assert_eq!(nums, vec![1, 2, 3]);
        assert!(state.require_as::<Vec<u32>>("sum", "bad").is_err());
    }

    #[test]
    fn test_serializes_sorted() {
        let mut state = WorkflowState::default();
        state.merge(update(json!({"zeta": 1, "alpha": 2})));
        assert_eq!(
            serde_json::to_string(&state).unwrap(),
            r#"{"alpha":2,"zeta":1}"#
        );
    }
}
