// SPDX-License-Identifier: MIT

//! Stage trait - one step of a sequence

use std::sync::Arc;

use super::state::{StateUpdate, WorkflowState};
use crate::adk::error::PipelineError;

/// A named transformation: reads the record, returns a partial update.
///
/// Stages are synchronous and must not keep state between calls.
pub trait Stage: Send + Sync {
    /// Node id used when the stage is added to a sequence
    fn name(&self) -> &str;

    fn run(&self, state: &WorkflowState) -> Result<StateUpdate, PipelineError>;
}

/// Adapter turning a plain function into a `Stage`
pub struct FnStage<F> {
    name: String,
    func: F,
}

impl<F> FnStage<F>
where
    F: Fn(&WorkflowState) -> Result<StateUpdate, PipelineError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Stage for FnStage<F>
where
    F: Fn(&WorkflowState) -> Result<StateUpdate, PipelineError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, state: &WorkflowState) -> Result<StateUpdate, PipelineError> {
        (self.func)(state)
    }
}

/// Shorthand for `Arc::new(FnStage::new(name, func))`
pub fn stage<F>(name: impl Into<String>, func: F) -> Arc<dyn Stage>
where
    F: Fn(&WorkflowState) -> Result<StateUpdate, PipelineError> + Send + Sync + 'static,
{
    Arc::new(FnStage::new(name, func))
}

/// Build a single-key update
pub fn single(key: &str, value: impl Into<serde_json::Value>) -> StateUpdate {
    let mut update = StateUpdate::new();
    update.insert(key.to_string(), value.into());
    update
}
