//! Document processing shared by the insert and update handlers.
//!
//! Turns a [`DocumentInput`] plus workflow items into documents for the
//! store and, in parallel, into serialized output records. Each serialized
//! record carries `{metadata, pageContent}` and a back-reference to its
//! source item for per-item result attribution.

use crate::core::documents::Document;
use crate::core::error::Result;
use crate::node::context::{ExecutionItem, ExecutionRecord};
use crate::node::loaders::DocumentInput;
use serde_json::json;

/// Result of processing one or more workflow items.
#[derive(Debug, Clone)]
pub struct ProcessedDocuments {
    /// Documents to hand to the store
    pub documents: Vec<Document>,
    /// One serialized output record per document
    pub serialized: Vec<ExecutionRecord>,
}

fn serialize_document(document: &Document, item_index: Option<usize>) -> ExecutionRecord {
    let json = json!({
        "metadata": document.metadata,
        "pageContent": document.page_content,
    });
    match item_index {
        Some(index) => ExecutionRecord::paired(json, index),
        None => ExecutionRecord::new(json),
    }
}

/// Process a single workflow item into documents.
///
/// With a pre-built document input the documents are used as-is; with a
/// loader the item is converted through it. Serialized records are
/// attributed to `item_index`.
pub async fn process_document(
    input: &DocumentInput,
    item: &ExecutionItem,
    item_index: usize,
) -> Result<ProcessedDocuments> {
    let documents = match input {
        DocumentInput::Documents(documents) => documents.as_ref().clone(),
        DocumentInput::Loader(loader) => loader.process_item(item, item_index).await?,
    };

    let serialized = documents
        .iter()
        .map(|doc| serialize_document(doc, Some(item_index)))
        .collect();

    Ok(ProcessedDocuments {
        documents,
        serialized,
    })
}

/// Process all workflow items into documents.
pub async fn process_documents(
    input: &DocumentInput,
    items: &[ExecutionItem],
) -> Result<ProcessedDocuments> {
    let documents = match input {
        DocumentInput::Documents(documents) => documents.as_ref().clone(),
        DocumentInput::Loader(loader) => loader.process_all(items).await?,
    };

    let serialized = documents
        .iter()
        .map(|doc| serialize_document(doc, None))
        .collect();

    Ok(ProcessedDocuments {
        documents,
        serialized,
    })
}
