// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Document types for flowstore
//!
//! Documents are the unit of content indexed and retrieved through a vector
//! store: a text payload plus JSON-serializable metadata. They are created
//! by document loaders, consumed by the insert/update handlers, and returned
//! (with scores) by similarity search.
//!
//! Documents are never mutated after creation; normalization and reranking
//! always produce new instances.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A document: text content plus metadata.
///
/// The serialized field name `pageContent` is a compatibility contract with
/// downstream workflow consumers and must not change.
///
/// # Example
///
/// ```
/// use flowstore::core::documents::Document;
///
/// let doc = Document::new("Hello, world!")
///     .with_metadata("source", "greeting.txt");
/// assert_eq!(doc.page_content, "Hello, world!");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// The text content of the document
    #[serde(rename = "pageContent")]
    pub page_content: String,

    /// Metadata associated with the document
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    /// Optional unique identifier for the document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Document {
    /// Create a new document with the given text content.
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: HashMap::new(),
            id: None,
        }
    }

    /// Add a metadata entry (builder pattern).
    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Replace the whole metadata map (builder pattern).
    #[must_use]
    pub fn with_metadata_map(mut self, metadata: HashMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set the document ID (builder pattern).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_builder() {
        let doc = Document::new("text")
            .with_metadata("page", 1)
            .with_id("doc-1");
        assert_eq!(doc.page_content, "text");
        assert_eq!(doc.metadata.get("page"), Some(&json!(1)));
        assert_eq!(doc.id.as_deref(), Some("doc-1"));
    }

    #[test]
    fn test_document_serializes_page_content_field() {
        let doc = Document::new("hello").with_metadata("k", "v");
        let value = serde_json::to_value(&doc).unwrap();
        // pageContent is a wire-format contract with downstream consumers
        assert_eq!(value["pageContent"], json!("hello"));
        assert_eq!(value["metadata"]["k"], json!("v"));
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_document_deserializes_without_metadata() {
        let doc: Document = serde_json::from_str(r#"{"pageContent": "x"}"#).unwrap();
        assert_eq!(doc.page_content, "x");
        assert!(doc.metadata.is_empty());
    }
}
