// SPDX-License-Identifier: MIT

//! State management for sequences
//!
//! This module provides:
//! - `StateSchema` - declares the fields and types a sequence expects
//! - `WorkflowState` - the record threaded through the stages
//! - `StateUpdate` - the partial update a stage hands back

mod schema;
mod store;

pub use schema::{type_name, FieldType, StateFieldDef, StateSchema, INPUT_STAGE};
pub use store::{StateUpdate, WorkflowState};
