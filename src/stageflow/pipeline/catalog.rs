// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::sync::Arc;

use super::basic::{step1, step2, step3};
use super::stage::Stage;
use super::text_analysis::{
    analyze_sentiment_stage, generate_report_stage, preprocess_stage, summarize_stage,
};
use crate::adk::error::CompilationError;

/// Named stages that sequence files may refer to
#[derive(Clone, Default)]
pub struct StageCatalog {
    stages: BTreeMap<String, Arc<dyn Stage>>,
}

impl StageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding every stage shipped with the crate
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for stage in [
            preprocess_stage(),
            analyze_sentiment_stage(),
            summarize_stage(),
            generate_report_stage(),
            step1(),
            step2(),
            step3(),
        ] {
            catalog.register(stage);
        }
        catalog
    }

    /// Register a stage under its own name, replacing any previous one
    pub fn register(&mut self, stage: Arc<dyn Stage>) {
        self.stages.insert(stage.name().to_string(), stage);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Stage>> {
        self.stages.get(name).cloned()
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Stage>, CompilationError> {
        self.get(name)
            .ok_or_else(|| CompilationError::UnknownStage(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stages.keys().map(|s| s.as_str())
    }
}
