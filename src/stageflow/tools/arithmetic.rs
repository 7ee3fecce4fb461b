// SPDX-License-Identifier: MIT

use crate::adk::error::ToolError;
use crate::adk::tool::{parse_args, Tool};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{json, Value};

// --- Static schema ---

static BINARY_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "x": {
                "type": "number",
                "description": "The first number"
            },
            "y": {
                "type": "number",
                "description": "The second number"
            }
        },
        "required": ["x", "y"]
    })
});

#[derive(Debug, Deserialize)]
pub struct BinaryArgs {
    pub x: f64,
    pub y: f64,
}

pub struct AddTool;

#[async_trait]
impl Tool for AddTool {
    fn name(&self) -> &str {
        "add"
    }

    fn description(&self) -> &str {
        "Add two numbers together. Returns the sum of x and y."
    }

    fn schema(&self) -> &Value {
        &BINARY_SCHEMA
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let args: BinaryArgs = parse_args(input)?;
        Ok(json!(args.x + args.y))
    }
}

pub struct SubtractTool;

#[async_trait]
impl Tool for SubtractTool {
    fn name(&self) -> &str {
        "subtract"
    }

    fn description(&self) -> &str {
        "Subtract two numbers. Returns the difference x - y."
    }

    fn schema(&self) -> &Value {
        &BINARY_SCHEMA
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let args: BinaryArgs = parse_args(input)?;
        Ok(json!(args.x - args.y))
    }
}
