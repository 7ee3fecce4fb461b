// SPDX-License-Identifier: MIT

//! Named document store backing the storage tools

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::adk::error::ToolError;

/// Separator placed between documents when several are rendered together
pub const DOCUMENT_SEPARATOR: &str = "\n\n----------------------\n\n";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    pub fn new(content: impl Into<String>, metadata: BTreeMap<String, String>) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// Pretty-printed metadata followed by the content
    pub fn render(&self) -> String {
        let metadata =
            serde_json::to_string_pretty(&self.metadata).unwrap_or_else(|_| "{}".to_string());
        format!("{}\n{}", metadata, self.content)
    }
}

pub fn render_documents(docs: &[Document]) -> String {
    docs.iter()
        .map(Document::render)
        .collect::<Vec<_>>()
        .join(DOCUMENT_SEPARATOR)
}

#[derive(Debug, Default)]
struct DocumentIndex {
    docs: HashMap<String, Document>,
    /// Names in first-insertion order
    order: Vec<String>,
}

/// Shared handle to an in-memory document store.
///
/// Clones share the same documents; create one per application and hand it
/// to the tools and the server.
#[derive(Clone, Default)]
pub struct DocumentStore {
    inner: Arc<RwLock<DocumentIndex>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `doc` under `name`; returns true when an older document was replaced
    pub async fn put(&self, name: &str, doc: Document) -> bool {
        let mut index = self.inner.write().await;
        let replaced = index.docs.insert(name.to_string(), doc).is_some();
        if !replaced {
            index.order.push(name.to_string());
        }
        replaced
    }

    pub async fn get(&self, name: &str) -> Option<Document> {
        self.inner.read().await.docs.get(name).cloned()
    }

    /// Fetch every named document, failing on the first unknown name
    pub async fn get_many(&self, names: &[String]) -> Result<Vec<Document>, ToolError> {
        let index = self.inner.read().await;
        names
            .iter()
            .map(|name| {
                index
                    .docs
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ToolError::not_found("Document", name.as_str()))
            })
            .collect()
    }

    /// One `-{name}: {summary}` line per document, in insertion order
    pub async fn index(&self) -> String {
        let index = self.inner.read().await;
        index
            .order
            .iter()
            .filter_map(|name| {
                let doc = index.docs.get(name)?;
                let summary = doc.metadata.get("summary").map(String::as_str).unwrap_or("");
                Some(format!("-{}: {}", name, summary))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub async fn names(&self) -> Vec<String> {
        self.inner.read().await.order.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.docs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str, summary: &str) -> Document {
        let mut metadata = BTreeMap::new();
        metadata.insert("summary".to_string(), summary.to_string());
        Document::new(content, metadata)
    }

    #[test]
    fn test_render() {
        let mut metadata = BTreeMap::new();
        metadata.insert("title".to_string(), "Intro".to_string());
        let rendered = Document::new("Hello", metadata).render();
        assert_eq!(rendered, "{\n  \"title\": \"Intro\"\n}\nHello");

        assert_eq!(Document::new("x", BTreeMap::new()).render(), "{}\nx");
    }

    #[test]
    fn test_render_documents_separator() {
        let docs = vec![
            Document::new("a", BTreeMap::new()),
            Document::new("b", BTreeMap::new()),
        ];
        assert_eq!(
            render_documents(&docs),
            "{}\na\n\n----------------------\n\n{}\nb"
        );
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = DocumentStore::new();
        assert!(store.is_empty().await);

        assert!(!store.put("readme", doc("hello", "greeting")).await);
        assert_eq!(store.get("readme").await.unwrap().content, "hello");
        assert!(store.get("missing").await.is_none());

        assert!(store.put("readme", doc("bye", "farewell")).await);
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("readme").await.unwrap().content, "bye");
    }

    #[tokio::test]
    async fn test_get_many_fails_on_unknown() {
        let store = DocumentStore::new();
        store.put("a", doc("1", "one")).await;

        let names = vec!["a".to_string(), "b".to_string()];
        let err = store.get_many(&names).await.unwrap_err();
        assert_eq!(err.to_string(), "Document 'b' not found");

        let found = store.get_many(&names[..1]).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_index_keeps_insertion_order() {
        let store = DocumentStore::new();
        store.put("zeta", doc("z", "last letter")).await;
        store.put("alpha", doc("a", "first letter")).await;
        store.put("zeta", doc("z2", "still last")).await;

        assert_eq!(
            store.index().await,
            "-zeta: still last\n-alpha: first letter"
        );
        assert_eq!(store.names().await, vec!["zeta", "alpha"]);
    }

    #[tokio::test]
    async fn test_clones_share_documents() {
        let store = DocumentStore::new();
        let other = store.clone();
        other.put("shared", doc("s", "")).await;
        assert!(store.get("shared").await.is_some());
    }
}
