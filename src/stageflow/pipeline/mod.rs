// SPDX-License-Identifier: MIT

//! Sequential pipelines
//!
//! A pipeline is a fixed chain of stages over a shared record. Each stage
//! reads fields written by earlier stages and returns a partial update that
//! is merged into the record before the next stage runs.

pub mod basic;
pub mod catalog;
pub mod loader;
pub mod sequence;
pub mod stage;
pub mod state;
pub mod text_analysis;

pub use basic::{run_basic, BasicMethod, BasicResult};
pub use catalog::StageCatalog;
pub use loader::{SequenceDef, SequenceLoader};
pub use sequence::{CompiledSequence, SequenceBuilder, StageEvent, END};
pub use stage::{FnStage, Stage};
pub use state::{StateSchema, StateUpdate, WorkflowState};
pub use text_analysis::{analyze_text, create_text_analysis_sequence, TextAnalysis};
