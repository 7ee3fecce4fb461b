// SPDX-License-Identifier: MIT

use crate::adk::error::{Result, StageflowError};
use crate::adk::tool::Tool;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct ToolRegistry {
    tools: Arc<RwLock<HashMap<String, Arc<dyn Tool>>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn register(&self, tool: Arc<dyn Tool>) {
        let mut tools = self.tools.write().await;
        tools.insert(tool.name().to_string(), tool);
    }

    pub async fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().await;
        tools.get(name).cloned()
    }

    /// Specs of all registered tools, sorted by name
    pub async fn list(&self) -> Vec<Value> {
        let tools = self.tools.read().await;
        let mut names: Vec<&String> = tools.keys().collect();
        names.sort();
        names.into_iter().map(|name| tools[name].spec()).collect()
    }

    /// Look up `name` and run it with `args`
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value> {
        let tool = self
            .get(name)
            .await
            .ok_or_else(|| StageflowError::tool_not_found(name))?;
        log::debug!("Executing tool '{}'", name);
        Ok(tool.execute(args).await?)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adk::error::ToolError;
    use async_trait::async_trait;
    use serde_json::json;

    use once_cell::sync::Lazy;

    static MOCK_SCHEMA: Lazy<Value> = Lazy::new(|| {
        json!({
            "type": "object",
            "properties": {}
        })
    });

    /// A mock tool that echoes its input
    struct MockTool {
        name: String,
        description: String,
    }

    impl MockTool {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                description: format!("Mock tool: {}", name),
            }
        }
    }

    #[async_trait]
    impl Tool for MockTool {
        fn name(&self) -> &str {
            &self.name
        }

        fn description(&self) -> &str {
            &self.description
        }

        fn schema(&self) -> &Value {
            &MOCK_SCHEMA
        }

        async fn execute(&self, input: Value) -> std::result::Result<Value, ToolError> {
            if input.get("fail").is_some() {
                return Err(ToolError::Failed("asked to fail".to_string()));
            }
            Ok(json!({"echo": input}))
        }
    }

    #[tokio::test]
    async fn test_register_and_get_tool() {
        let registry = ToolRegistry::new();
        let tool = Arc::new(MockTool::new("test_tool"));

        registry.register(tool).await;

        let retrieved = registry.get("test_tool").await;
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().name(), "test_tool");
    }

    #[tokio::test]
    async fn test_get_nonexistent_tool() {
        let registry = ToolRegistry::new();
        assert!(registry.get("nonexistent").await.is_none());
    }

    #[tokio::test]
    async fn test_register_overwrites_existing() {
        let registry = ToolRegistry::new();

        registry
            .register(Arc::new(MockTool::new("same_name")))
            .await;
        registry
            .register(Arc::new(MockTool::new("same_name")))
            .await;

        assert_eq!(registry.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_registry_is_clone() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(MockTool::new("tool1"))).await;

        let cloned = registry.clone();
        assert!(cloned.get("tool1").await.is_some());

        // Registering on clone should be visible to original
        cloned.register(Arc::new(MockTool::new("tool2"))).await;
        assert!(registry.get("tool2").await.is_some());
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(MockTool::new("zeta"))).await;
        registry.register(Arc::new(MockTool::new("alpha"))).await;

        let names: Vec<Value> = registry
            .list()
            .await
            .into_iter()
            .map(|spec| spec["name"].clone())
            .collect();
        assert_eq!(names, vec![json!("alpha"), json!("zeta")]);
    }

    #[tokio::test]
    async fn test_execute() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(MockTool::new("echo"))).await;

        let out = registry.execute("echo", json!({"a": 1})).await.unwrap();
        assert_eq!(out, json!({"echo": {"a": 1}}));

        let err = registry.execute("missing", json!({})).await.unwrap_err();
        assert!(matches!(err, StageflowError::ToolNotFound { .. }));

        let err = registry
            .execute("echo", json!({"fail": true}))
            .await
            .unwrap_err();
        assert!(matches!(err, StageflowError::Tool(ToolError::Failed(_))));
    }
}
