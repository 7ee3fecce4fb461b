// SPDX-License-Identifier: MIT

//! Document storage tools: save, fetch and list named documents

use crate::adk::error::ToolError;
use crate::adk::tool::{parse_args, Tool};
use crate::stageflow::pipeline::text_analysis::summarize;
use crate::stageflow::store::{render_documents, Document, DocumentStore};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

static ADD_TO_STORAGE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "name": {
                "type": "string",
                "description": "The name of the document to store (can be a url or document title)"
            },
            "content": {
                "type": "string",
                "description": "The content of the document to store"
            },
            "metadata": {
                "type": "object",
                "additionalProperties": {"type": "string"},
                "description": "Extra metadata about the document such as author, source_url, etc."
            }
        },
        "required": ["name", "content"]
    })
});

static GET_FROM_STORAGE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "doc_names": {
                "type": "array",
                "items": {"type": "string"},
                "description": "The names of the documents to get"
            }
        },
        "required": ["doc_names"]
    })
});

static STORAGE_INDEX_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {}
    })
});

#[derive(Debug, Deserialize)]
pub struct AddToStorageArgs {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct GetFromStorageArgs {
    pub doc_names: Vec<String>,
}

/// Stores a document, tagging it with a short summary of its content
pub struct AddToStorageTool {
    store: DocumentStore,
}

impl AddToStorageTool {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for AddToStorageTool {
    fn name(&self) -> &str {
        "add_to_storage"
    }

    fn description(&self) -> &str {
        "Store a document for later retrieval. Metadata is arbitrary key/value information such as title and source_url."
    }

    fn schema(&self) -> &Value {
        &ADD_TO_STORAGE_SCHEMA
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let args: AddToStorageArgs = parse_args(input)?;
        let mut metadata = args.metadata;
        metadata.insert("summary".to_string(), summarize(args.content.trim()));

        let replaced = self
            .store
            .put(&args.name, Document::new(args.content, metadata))
            .await;
        log::info!(
            "Stored document '{}'{}",
            args.name,
            if replaced { " (replaced)" } else { "" }
        );
        Ok(json!(format!("Saved document: {}", args.name)))
    }
}

/// Returns the named documents rendered as text
pub struct GetFromStorageTool {
    store: DocumentStore,
}

impl GetFromStorageTool {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetFromStorageTool {
    fn name(&self) -> &str {
        "get_from_storage"
    }

    fn description(&self) -> &str {
        "Get the documents from storage for the given names."
    }

    fn schema(&self) -> &Value {
        &GET_FROM_STORAGE_SCHEMA
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let args: GetFromStorageArgs = parse_args(input)?;
        let docs = self.store.get_many(&args.doc_names).await?;
        Ok(json!(render_documents(&docs)))
    }
}

/// Lists stored documents with their summaries
pub struct StorageIndexTool {
    store: DocumentStore,
}

impl StorageIndexTool {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for StorageIndexTool {
    fn name(&self) -> &str {
        "storage_index"
    }

    fn description(&self) -> &str {
        "Get the index of the knowledge base: one line per stored document with its summary."
    }

    fn schema(&self) -> &Value {
        &STORAGE_INDEX_SCHEMA
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        // no arguments, but reject garbage
        let _: BTreeMap<String, Value> = parse_args(input)?;
        Ok(json!(self.store.index().await))
    }
}
