// SPDX-License-Identifier: MIT

//! In-memory stores injected into tools and the server

pub mod documents;
pub mod memory;

pub use documents::{render_documents, Document, DocumentStore, DOCUMENT_SEPARATOR};
pub use memory::{MemoryStore, StoreItem};
