// SPDX-License-Identifier: MIT

//! Per-user memory tools

use crate::adk::error::ToolError;
use crate::adk::tool::{parse_args, Tool};
use crate::stageflow::store::MemoryStore;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{json, Value};

pub const MEMORIES_NAMESPACE: &str = "memories";
pub const DEFAULT_USER: &str = "user1";

static SAVE_MEMORY_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "memory": {
                "type": "string",
                "description": "The fact to remember about the user"
            },
            "user_id": {
                "type": "string",
                "description": "Whose memory this is (defaults to user1)"
            }
        },
        "required": ["memory"]
    })
});

static RECALL_MEMORIES_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "user_id": {
                "type": "string",
                "description": "Whose memories to list (defaults to user1)"
            }
        }
    })
});

#[derive(Debug, Deserialize)]
pub struct SaveMemoryArgs {
    pub memory: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecallMemoriesArgs {
    #[serde(default)]
    pub user_id: Option<String>,
}

fn user_or_default(user_id: Option<String>) -> String {
    user_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| DEFAULT_USER.to_string())
}

/// Render a user's memories as a system-prompt line
pub async fn memory_prompt(store: &MemoryStore, user_id: &str) -> String {
    let memories: Vec<String> = store
        .search(&[MEMORIES_NAMESPACE, user_id])
        .await
        .into_iter()
        .filter_map(|item| item.value.get("data")?.as_str().map(str::to_string))
        .collect();
    format!("User memories: {}", memories.join(", "))
}

pub struct SaveMemoryTool {
    store: MemoryStore,
}

impl SaveMemoryTool {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for SaveMemoryTool {
    fn name(&self) -> &str {
        "save_memory"
    }

    fn description(&self) -> &str {
        "Save the given memory for the current user."
    }

    fn schema(&self) -> &Value {
        &SAVE_MEMORY_SCHEMA
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let args: SaveMemoryArgs = parse_args(input)?;
        let user_id = user_or_default(args.user_id);
        let namespace = [MEMORIES_NAMESPACE, user_id.as_str()];

        let key = self
            .store
            .append(&namespace, "memory", json!({ "data": args.memory }))
            .await;
        log::debug!("Saved {} for {}", key, user_id);

        Ok(json!(format!("Saved memory: {}", args.memory)))
    }
}

pub struct RecallMemoriesTool {
    store: MemoryStore,
}

impl RecallMemoriesTool {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for RecallMemoriesTool {
    fn name(&self) -> &str {
        "recall_memories"
    }

    fn description(&self) -> &str {
        "List everything remembered about the current user."
    }

    fn schema(&self) -> &Value {
        &RECALL_MEMORIES_SCHEMA
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let args: RecallMemoriesArgs = parse_args(input)?;
        let user_id = user_or_default(args.user_id);
        Ok(json!(memory_prompt(&self.store, &user_id).await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_recall() {
        let store = MemoryStore::new();
        let save = SaveMemoryTool::new(store.clone());
        let recall = RecallMemoriesTool::new(store.clone());

        let out = save
            .execute(json!({"memory": "my name is John Doe", "user_id": "1"}))
            .await
            .unwrap();
        assert_eq!(out, json!("Saved memory: my name is John Doe"));
        save.execute(json!({"memory": "likes tea", "user_id": "1"}))
            .await
            .unwrap();

        let item = store.get(&["memories", "1"], "memory_1").await.unwrap();
        assert_eq!(item.value, json!({"data": "likes tea"}));

        let recalled = recall.execute(json!({"user_id": "1"})).await.unwrap();
        assert_eq!(
            recalled,
            json!("User memories: my name is John Doe, likes tea")
        );
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let store = MemoryStore::new();
        let save = SaveMemoryTool::new(store.clone());
        save.execute(json!({"memory": "default user fact"}))
            .await
            .unwrap();
        save.execute(json!({"memory": "other fact", "user_id": "2"}))
            .await
            .unwrap();

        assert_eq!(
            memory_prompt(&store, DEFAULT_USER).await,
            "User memories: default user fact"
        );
        assert_eq!(memory_prompt(&store, "2").await, "User memories: other fact");
        assert_eq!(memory_prompt(&store, "3").await, "User memories: ");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_saves_are_all_kept() {
        let store = MemoryStore::new();
        let save = std::sync::Arc::new(SaveMemoryTool::new(store.clone()));

        let handles: Vec<_> = (0..200)
            .map(|i| {
                let save = save.clone();
                tokio::spawn(async move { save.execute(json!({ "memory": format!("m{}", i) })).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let items = store.search(&[MEMORIES_NAMESPACE, DEFAULT_USER]).await;
        assert_eq!(items.len(), 200);
        let mut keys: Vec<&str> = items.iter().map(|i| i.key.as_str()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 200);
    }

    #[tokio::test]
    async fn test_recall_without_arguments() {
        let recall = RecallMemoriesTool::new(MemoryStore::new());
        assert_eq!(
            recall.execute(Value::Null).await.unwrap(),
            json!("User memories: ")
        );
    }
}
