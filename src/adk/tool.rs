// SPDX-License-Identifier: MIT

use crate::adk::error::ToolError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// Trait for tools exposed to agents and to the HTTP API.
///
/// `name()`, `description()` and `schema()` borrow from the implementor;
/// schemas are expected to live in `Lazy` statics.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool name (unique within a registry)
    fn name(&self) -> &str;

    /// Returns a human-readable description of what the tool does
    fn description(&self) -> &str;

    /// Returns the JSON schema for the tool's input parameters
    fn schema(&self) -> &Value;

    /// Execute the tool with the given input and return the result
    async fn execute(&self, input: Value) -> Result<Value, ToolError>;

    /// Function-calling style description of the tool
    fn spec(&self) -> Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "parameters": self.schema(),
        })
    }
}

/// Deserialize tool arguments, treating `null` as an empty object so
/// argument-less tools can be called without a body.
pub fn parse_args<T: DeserializeOwned>(input: Value) -> Result<T, ToolError> {
    let input = match input {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    Ok(serde_json::from_value(input)?)
}
