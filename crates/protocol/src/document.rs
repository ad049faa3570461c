//! Source document model.
//!
//! A source document is a retrieved passage plus the metadata describing
//! where it came from. Documents are produced by the retriever and passed
//! through the answer stream untouched, so the client can show them as
//! evidence next to the answer.
//!
//! This struct is what the built-in retrievers produce. The wire does not
//! depend on it: the frame parser returns raw JSON values, so documents from
//! other retrievers keep any extra fields they carry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

/// A retrieved context passage and its origin metadata.
///
/// Serialized with camelCase keys to match what the chat client expects:
///
/// ```json
/// {
///   "pageContent": "Rust is a systems programming language...",
///   "metadata": { "source": "rust-book.pdf", "page": 3 }
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct SourceDocument {
    /// The text of the retrieved chunk.
    pub page_content: String,

    /// Arbitrary metadata attached at ingestion time.
    ///
    /// Usually carries a `source` entry (file name or URL).
    #[serde(default)]
    #[ts(type = "Record<string, unknown>")]
    pub metadata: Map<String, Value>,
}

impl SourceDocument {
    /// Create a document with the given content and `source` metadata entry.
    pub fn new(page_content: impl Into<String>, source: impl Into<String>) -> Self {
        let mut metadata = Map::new();
        metadata.insert("source".to_string(), Value::String(source.into()));
        Self {
            page_content: page_content.into(),
            metadata,
        }
    }

    /// Add or replace a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The `source` metadata entry, if present and a string.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").and_then(Value::as_str)
    }
}
