// SPDX-License-Identifier: MIT

//! Three-step demonstration sequence, built three different ways

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::sequence::{CompiledSequence, SequenceBuilder, END};
use super::stage::{single, stage, Stage};
use super::state::{FieldType, StateSchema, WorkflowState};
use crate::adk::error::{CompilationError, PipelineError};

/// How the sequence is assembled; all three produce the same chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasicMethod {
    /// `add_node` + `add_edge` + `set_entry_point`
    Explicit,
    /// `add_sequence` on a named builder
    Shorthand,
    /// `add_sequence` on a builder fed from a prepared list
    Empty,
}

impl BasicMethod {
    pub const ALL: [BasicMethod; 3] = [
        BasicMethod::Explicit,
        BasicMethod::Shorthand,
        BasicMethod::Empty,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BasicMethod::Explicit => "explicit",
            BasicMethod::Shorthand => "shorthand",
            BasicMethod::Empty => "empty",
        }
    }
}

impl fmt::Display for BasicMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BasicMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "explicit" => Ok(BasicMethod::Explicit),
            "shorthand" => Ok(BasicMethod::Shorthand),
            "empty" => Ok(BasicMethod::Empty),
            other => Err(format!("unknown construction method: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicResult {
    pub input: String,
    pub step1_result: String,
    pub step2_result: String,
    pub step3_result: String,
}

pub fn step1() -> Arc<dyn Stage> {
    stage("step1", |state: &WorkflowState| {
        let input = state.require_str("step1", "input")?;
        Ok(single("step1_result", format!("Processed input: {}", input)))
    })
}

pub fn step2() -> Arc<dyn Stage> {
    stage("step2", |state: &WorkflowState| {
        let prev = state.require_str("step2", "step1_result")?;
        Ok(single("step2_result", format!("Further processed: {}", prev)))
    })
}

pub fn step3() -> Arc<dyn Stage> {
    stage("step3", |state: &WorkflowState| {
        let prev = state.require_str("step3", "step2_result")?;
        Ok(single("step3_result", format!("Final processing: {}", prev)))
    })
}

fn basic_schema() -> StateSchema {
    StateSchema::default().field("input", FieldType::String, true)
}

pub fn create_explicit_sequence() -> Result<CompiledSequence, CompilationError> {
    let mut builder = SequenceBuilder::new("basic-explicit").with_schema(basic_schema());
    builder
        .add_node("step1", step1())
        .add_node("step2", step2())
        .add_node("step3", step3())
        .add_edge("step1", "step2")
        .add_edge("step2", "step3")
        .add_edge("step3", END)
        .set_entry_point("step1");
    builder.compile()
}

pub fn create_shorthand_sequence() -> Result<CompiledSequence, CompilationError> {
    let mut builder = SequenceBuilder::new("basic-shorthand").with_schema(basic_schema());
    builder.add_sequence(vec![step1(), step2(), step3()]);
    builder.compile()
}

pub fn create_empty_sequence() -> Result<CompiledSequence, CompilationError> {
    let mut builder = SequenceBuilder::new("basic-empty");
    let stages: Vec<Arc<dyn Stage>> = vec![step1(), step2(), step3()];
    builder.add_sequence(stages);
    builder.with_schema(basic_schema()).compile()
}

pub fn create_basic_sequence(method: BasicMethod) -> Result<CompiledSequence, CompilationError> {
    match method {
        BasicMethod::Explicit => create_explicit_sequence(),
        BasicMethod::Shorthand => create_shorthand_sequence(),
        BasicMethod::Empty => create_empty_sequence(),
    }
}

/// Build the sequence with `method` and run it on `input`
pub fn run_basic(method: BasicMethod, input: &str) -> Result<BasicResult, PipelineError> {
    let state = create_basic_sequence(method)?.invoke(json!({ "input": input }))?;
    serde_json::from_value(state.into_json())
        .map_err(|e| PipelineError::invalid_input("step3", "step3_result", e.to_string()))
}
