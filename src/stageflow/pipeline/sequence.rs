// SPDX-License-Identifier: MIT

//! Linear sequences: build with nodes and edges, compile, invoke.
//!
//! A sequence is a chain `entry -> ... -> END`. The builder accepts the
//! node/edge vocabulary of a state graph, and `compile` flattens it into an
//! ordered list of stages after checking that the chain really is linear.

use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::stage::Stage;
use super::state::{StateSchema, StateUpdate, WorkflowState, INPUT_STAGE};
use crate::adk::error::{CompilationError, PipelineError};

/// Terminal pseudo-node for `add_edge`
pub const END: &str = "__end__";

/// Emitted after each stage by `CompiledSequence::invoke_with`
#[derive(Debug, Clone, Serialize)]
pub struct StageEvent {
    pub stage: String,
    pub update: StateUpdate,
}

/// Sequence under construction
pub struct SequenceBuilder {
    name: String,
    schema: StateSchema,
    nodes: HashMap<String, Arc<dyn Stage>>,
    /// Insertion order, used to report problems deterministically
    node_order: Vec<String>,
    edges: Vec<(String, String)>,
    entry_point: Option<String>,
    duplicates: Vec<String>,
}

impl SequenceBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: StateSchema::default(),
            nodes: HashMap::new(),
            node_order: Vec::new(),
            edges: Vec::new(),
            entry_point: None,
            duplicates: Vec::new(),
        }
    }

    /// Declare the input the sequence expects
    pub fn with_schema(mut self, schema: StateSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Register a stage under `id`
    pub fn add_node(&mut self, id: impl Into<String>, stage: Arc<dyn Stage>) -> &mut Self {
        let id = id.into();
        if self.nodes.insert(id.clone(), stage).is_some() {
            self.duplicates.push(id);
        } else {
            self.node_order.push(id);
        }
        self
    }

    /// Connect `from` to `to`; `to` may be `END`
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    pub fn set_entry_point(&mut self, id: impl Into<String>) -> &mut Self {
        self.entry_point = Some(id.into());
        self
    }

    /// Add stages under their own names and chain them in order.
    ///
    /// Sets the entry point when none is set yet and ends the chain at `END`.
    pub fn add_sequence(&mut self, stages: Vec<Arc<dyn Stage>>) -> &mut Self {
        let ids: Vec<String> = stages.iter().map(|s| s.name().to_string()).collect();
        for stage in stages {
            self.add_node(stage.name().to_string(), stage);
        }
        for pair in ids.windows(2) {
            self.add_edge(pair[0].clone(), pair[1].clone());
        }
        if let Some(first) = ids.first() {
            if self.entry_point.is_none() {
                self.entry_point = Some(first.clone());
            }
        }
        if let Some(last) = ids.last() {
            self.add_edge(last.clone(), END);
        }
        self
    }

    /// Validate the chain and flatten it into an ordered list of stages
    pub fn compile(self) -> Result<CompiledSequence, CompilationError> {
        if self.nodes.is_empty() {
            return Err(CompilationError::Empty);
        }
        if let Some(id) = self.duplicates.first() {
            return Err(CompilationError::DuplicateNode(id.clone()));
        }

        let entry = self
            .entry_point
            .clone()
            .ok_or(CompilationError::MissingEntryPoint)?;
        if !self.nodes.contains_key(&entry) {
            return Err(CompilationError::NodeNotFound(entry));
        }

        let mut next: HashMap<&str, &str> = HashMap::new();
        for (from, to) in &self.edges {
            if !self.nodes.contains_key(from) {
                return Err(CompilationError::NodeNotFound(from.clone()));
            }
            if to != END && !self.nodes.contains_key(to) {
                return Err(CompilationError::NodeNotFound(to.clone()));
            }
            if let Some(existing) = next.insert(from.as_str(), to.as_str()) {
                // the same edge declared twice is harmless
                if existing != to {
                    return Err(CompilationError::Branching(from.clone()));
                }
            }
        }

        // Walk from the entry point; a node without an outgoing edge ends the chain
        let mut order: Vec<String> = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut current = entry.as_str();
        loop {
            if !visited.insert(current) {
                let start = order.iter().position(|id| id == current).unwrap_or(0);
                let mut cycle = order[start..].to_vec();
                cycle.push(current.to_string());
                return Err(CompilationError::Cycle(cycle));
            }
            order.push(current.to_string());
            match next.get(current) {
                Some(&to) if to != END => current = to,
                _ => break,
            }
        }

        if let Some(orphan) = self
            .node_order
            .iter()
            .find(|id| !visited.contains(id.as_str()))
        {
            return Err(CompilationError::Unreachable(orphan.clone()));
        }

        let stages = order
            .iter()
            .map(|id| (id.clone(), Arc::clone(&self.nodes[id])))
            .collect();

        Ok(CompiledSequence {
            name: self.name,
            schema: self.schema,
            stages,
        })
    }
}

/// Immutable, ready-to-run sequence
pub struct CompiledSequence {
    name: String,
    schema: StateSchema,
    stages: Vec<(String, Arc<dyn Stage>)>,
}

impl CompiledSequence {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &StateSchema {
        &self.schema
    }

    /// Node ids in execution order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|(id, _)| id.as_str()).collect()
    }

    /// Run every stage in order and return the final record
    pub fn invoke(&self, input: Value) -> Result<WorkflowState, PipelineError> {
        self.invoke_with(input, |_| {})
    }

    /// Like `invoke`, calling `observer` after each stage has been merged
    pub fn invoke_with<F>(&self, input: Value, mut observer: F) -> Result<WorkflowState, PipelineError>
    where
        F: FnMut(&StageEvent),
    {
        let input = match input {
            Value::Object(map) => map,
            other => {
                return Err(PipelineError::invalid_input(
                    INPUT_STAGE,
                    "<root>",
                    format!(
                        "must be an object, got {}",
                        super::state::type_name(&other)
                    ),
                ))
            }
        };
        self.schema.validate(&input)?;

        let mut state = WorkflowState::from_input(&self.schema, input);
        log::info!("Running sequence {} ({} stages)", self.name, self.stages.len());

        for (id, stage) in &self.stages {
            log::debug!("Sequence {}: running stage {}", self.name, id);
            let update = stage.run(&state).map_err(|e| {
                log::error!("Sequence {}: stage {} failed: {}", self.name, id, e);
                e
            })?;

            let event = StageEvent {
                stage: id.clone(),
                update,
            };
            observer(&event);
            state.merge(event.update);
        }

        log::info!("Sequence {} completed", self.name);
        Ok(state)
    }
}
