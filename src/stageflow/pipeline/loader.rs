// SPDX-License-Identifier: MIT

//! Sequence loader - YAML file loading and parsing
//!
//! A sequence file names its stages in order; they are resolved against a
//! `StageCatalog` and compiled with `SequenceBuilder::add_sequence`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::catalog::StageCatalog;
use super::sequence::{CompiledSequence, SequenceBuilder};
use super::state::StateSchema;
use crate::adk::error::{CompilationError, Result};

/// A sequence as written in a YAML file
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SequenceDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Declared input fields
    #[serde(default)]
    pub state: StateSchema,
    /// Stage names, in execution order
    pub stages: Vec<String>,
}

impl SequenceDef {
    /// Resolve the stages and compile the chain
    pub fn build(&self, catalog: &StageCatalog) -> std::result::Result<CompiledSequence, CompilationError> {
        let stages = self
            .stages
            .iter()
            .map(|name| catalog.resolve(name))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut builder = SequenceBuilder::new(self.name.clone()).with_schema(self.state.clone());
        builder.add_sequence(stages);
        builder.compile()
    }
}

/// Loads sequence definitions from YAML files
pub struct SequenceLoader;

impl SequenceLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a sequence definition from a YAML file
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<SequenceDef> {
        let path = path.as_ref();
        log::debug!("Loading sequence from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse a sequence definition from a YAML string
    pub fn parse_yaml(content: &str) -> Result<SequenceDef> {
        let def: SequenceDef = serde_yaml::from_str(content)?;
        Ok(def)
    }
}

impl Default for SequenceLoader {
    fn default() -> Self {
        Self::new()
    }
}
