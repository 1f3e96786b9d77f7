// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Document loaders: normalize workflow items into documents.
//!
//! The insert and update handlers accept either pre-built documents or a
//! [`DocumentLoader`] connected by the platform. [`JsonRecordLoader`]
//! handles the common case: arbitrary JSON records from upstream nodes,
//! converted into one document per item with best-effort content and
//! metadata extraction.

use crate::core::documents::Document;
use crate::core::error::Result;
use crate::node::context::ExecutionItem;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Content fields tried in priority order before falling back to
/// recursive string extraction.
const CONTENT_FIELDS: [&str; 8] = [
    "content",
    "text",
    "body",
    "description",
    "message",
    "pageContent",
    "data",
    "value",
];

/// Fields treated as content and excluded from extracted metadata.
const METADATA_EXCLUDED_FIELDS: [&str; 6] = [
    "content",
    "text",
    "body",
    "description",
    "message",
    "pageContent",
];

/// Maximum serialized length for object-valued metadata fields; larger
/// values are dropped to bound storage cost.
const METADATA_VALUE_MAX_LEN: usize = 1000;

/// Maximum recursion depth for the string-leaf content fallback.
const CONTENT_EXTRACTION_MAX_DEPTH: usize = 3;

/// Converts workflow items into documents.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Convert a single item into documents.
    ///
    /// A loader that cannot extract anything from an item returns an empty
    /// list rather than an error; a failing record must not abort the
    /// batch.
    async fn process_item(&self, item: &ExecutionItem, item_index: usize) -> Result<Vec<Document>>;

    /// Convert all items into documents.
    async fn process_all(&self, items: &[ExecutionItem]) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        for (item_index, item) in items.iter().enumerate() {
            documents.extend(self.process_item(item, item_index).await?);
        }
        Ok(documents)
    }
}

/// Document source connected to the node's document input port.
#[derive(Clone)]
pub enum DocumentInput {
    /// Pre-built documents, used as-is
    Documents(Arc<Vec<Document>>),
    /// A loader that extracts documents from the input items
    Loader(Arc<dyn DocumentLoader>),
}

impl DocumentInput {
    /// Wrap pre-built documents.
    #[must_use]
    pub fn documents(documents: Vec<Document>) -> Self {
        DocumentInput::Documents(Arc::new(documents))
    }

    /// Wrap a loader.
    pub fn loader(loader: impl DocumentLoader + 'static) -> Self {
        DocumentInput::Loader(Arc::new(loader))
    }
}

impl std::fmt::Debug for DocumentInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentInput::Documents(docs) => {
                f.debug_tuple("Documents").field(&docs.len()).finish()
            }
            DocumentInput::Loader(_) => f.write_str("Loader"),
        }
    }
}

/// Extracts documents from arbitrary JSON workflow records.
///
/// Content comes from the first non-empty string field in
/// [`CONTENT_FIELDS`], falling back to a depth-bounded concatenation of
/// all string leaf values. Remaining scalar fields become metadata
/// verbatim; object fields are JSON-stringified when small enough and
/// dropped otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRecordLoader;

impl JsonRecordLoader {
    /// Create a new JSON record loader.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn extract_content(json: &Value) -> String {
        let Some(object) = json.as_object() else {
            // Scalar records become their string form
            return match json {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
        };

        for field in CONTENT_FIELDS {
            if let Some(Value::String(s)) = object.get(field) {
                if !s.is_empty() {
                    return s.clone();
                }
            }
        }

        let mut values = Vec::new();
        Self::collect_string_leaves(json, &mut values, 0);
        values.join(" ").trim().to_string()
    }

    fn collect_string_leaves(value: &Value, out: &mut Vec<String>, depth: usize) {
        if depth > CONTENT_EXTRACTION_MAX_DEPTH {
            return;
        }
        match value {
            Value::String(s) if !s.trim().is_empty() => out.push(s.trim().to_string()),
            Value::Object(map) => {
                for nested in map.values() {
                    Self::collect_string_leaves(nested, out, depth + 1);
                }
            }
            Value::Array(items) => {
                for nested in items {
                    Self::collect_string_leaves(nested, out, depth + 1);
                }
            }
            _ => {}
        }
    }

    fn extract_metadata(json: &Value, item_index: usize) -> HashMap<String, Value> {
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), Value::from("workflow"));
        metadata.insert("itemIndex".to_string(), Value::from(item_index));

        let Some(object) = json.as_object() else {
            return metadata;
        };

        for (key, value) in object {
            if METADATA_EXCLUDED_FIELDS.contains(&key.as_str()) {
                continue;
            }
            match value {
                Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => {
                    metadata.insert(key.clone(), value.clone());
                }
                Value::Object(_) | Value::Array(_) => {
                    let stringified = value.to_string();
                    if stringified.len() < METADATA_VALUE_MAX_LEN {
                        metadata.insert(key.clone(), Value::from(stringified));
                    }
                    // Oversized objects are dropped to bound storage cost
                }
            }
        }

        metadata
    }
}

#[async_trait]
impl DocumentLoader for JsonRecordLoader {
    async fn process_item(&self, item: &ExecutionItem, item_index: usize) -> Result<Vec<Document>> {
        let content = Self::extract_content(&item.json);
        if content.is_empty() {
            tracing::warn!(item_index, "no extractable content in item, skipping");
            return Ok(Vec::new());
        }

        let metadata = Self::extract_metadata(&item.json, item_index);
        Ok(vec![Document::new(content).with_metadata_map(metadata)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(json: Value) -> ExecutionItem {
        ExecutionItem::new(json)
    }

    #[tokio::test]
    async fn test_content_field_priority() {
        let loader = JsonRecordLoader::new();
        let docs = loader
            .process_item(
                &item(json!({"text": "from text", "body": "from body"})),
                0,
            )
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].page_content, "from text");
    }

    #[tokio::test]
    async fn test_empty_content_field_falls_through() {
        let loader = JsonRecordLoader::new();
        let docs = loader
            .process_item(&item(json!({"content": "", "body": "fallback"})), 0)
            .await
            .unwrap();
        assert_eq!(docs[0].page_content, "fallback");
    }

    #[tokio::test]
    async fn test_string_leaf_fallback_depth_bounded() {
        let loader = JsonRecordLoader::new();
        // "deep" sits at depth 4 and must be ignored
        let docs = loader
            .process_item(
                &item(json!({
                    "a": {"b": "near"},
                    "c": {"d": {"e": {"f": {"g": "deep"}}}}
                })),
                0,
            )
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].page_content, "near");
    }

    #[tokio::test]
    async fn test_unextractable_item_yields_zero_documents() {
        let loader = JsonRecordLoader::new();
        let docs = loader
            .process_item(&item(json!({"count": 42, "flag": true})), 0)
            .await
            .unwrap();
        // Numbers and booleans are not content
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_metadata_excludes_content_fields() {
        let loader = JsonRecordLoader::new();
        let docs = loader
            .process_item(
                &item(json!({"text": "hello", "author": "ada", "pages": 3})),
                5,
            )
            .await
            .unwrap();
        let metadata = &docs[0].metadata;
        assert!(!metadata.contains_key("text"));
        assert_eq!(metadata.get("author"), Some(&json!("ada")));
        assert_eq!(metadata.get("pages"), Some(&json!(3)));
        assert_eq!(metadata.get("itemIndex"), Some(&json!(5)));
    }

    #[tokio::test]
    async fn test_metadata_object_size_cap() {
        let loader = JsonRecordLoader::new();
        let small = json!({"k": "v"});
        let large = json!({"blob": "x".repeat(2000)});
        let docs = loader
            .process_item(
                &item(json!({"text": "hello", "small": small, "large": large})),
                0,
            )
            .await
            .unwrap();
        let metadata = &docs[0].metadata;
        // Small objects arrive stringified, oversized ones are dropped
        assert_eq!(metadata.get("small"), Some(&json!("{\"k\":\"v\"}")));
        assert!(!metadata.contains_key("large"));
        if let Some(Value::String(s)) = metadata.get("small") {
            assert!(s.len() < METADATA_VALUE_MAX_LEN);
        }
    }

    #[tokio::test]
    async fn test_scalar_record() {
        let loader = JsonRecordLoader::new();
        let docs = loader.process_item(&item(json!("plain string")), 0).await.unwrap();
        assert_eq!(docs[0].page_content, "plain string");
    }

    #[tokio::test]
    async fn test_process_all_concatenates() {
        let loader = JsonRecordLoader::new();
        let items = vec![
            item(json!({"text": "one"})),
            item(json!({"flag": false})),
            item(json!({"text": "two"})),
        ];
        let docs = loader.process_all(&items).await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].page_content, "one");
        assert_eq!(docs[1].page_content, "two");
    }
}
