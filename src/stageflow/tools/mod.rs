// SPDX-License-Identifier: MIT

pub mod arithmetic;
pub mod memory;
pub mod storage;

pub use arithmetic::{AddTool, SubtractTool};
pub use memory::{memory_prompt, RecallMemoriesTool, SaveMemoryTool};
pub use storage::{AddToStorageTool, GetFromStorageTool, StorageIndexTool};

use crate::adk::tool::Tool;
use crate::stageflow::registry::ToolRegistry;
use crate::stageflow::store::{DocumentStore, MemoryStore};
use std::sync::Arc;

/// Every built-in tool, bound to the given stores
pub fn builtin_tools(documents: &DocumentStore, memories: &MemoryStore) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(AddTool),
        Arc::new(SubtractTool),
        Arc::new(AddToStorageTool::new(documents.clone())),
        Arc::new(GetFromStorageTool::new(documents.clone())),
        Arc::new(StorageIndexTool::new(documents.clone())),
        Arc::new(SaveMemoryTool::new(memories.clone())),
        Arc::new(RecallMemoriesTool::new(memories.clone())),
    ]
}

pub async fn register_builtin_tools(
    registry: &ToolRegistry,
    documents: &DocumentStore,
    memories: &MemoryStore,
) {
    for tool in builtin_tools(documents, memories) {
        registry.register(tool).await;
    }
}
