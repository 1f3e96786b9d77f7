// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Update Documents: overwrite one store entry per item by external id.

use crate::core::callbacks::AiEvent;
use crate::core::error::{Error, Result};
use crate::core::vector_stores::VectorStoreProvider;
use crate::node::context::{ExecutionContext, ExecutionRecord};
use crate::node::loaders::{DocumentInput, JsonRecordLoader};
use crate::node::processing::process_document;
use std::sync::Arc;

/// Run the update operation over all input items.
///
/// Each item must carry an `id` parameter and produce exactly one document;
/// the document replaces the store entry under that id via `add_documents`.
/// Only called for backends that declare the update mode.
pub async fn execute(
    provider: &dyn VectorStoreProvider,
    context: &ExecutionContext,
) -> Result<Vec<ExecutionRecord>> {
    let embeddings = context.embeddings()?;
    let loader = DocumentInput::loader(JsonRecordLoader::new());

    let mut records = Vec::new();

    for (item_index, item) in context.items().iter().enumerate() {
        let document_id = context
            .parameters()
            .get_string("id", item_index)
            .map_err(|e| e.with_operation("update", item_index))?;

        let store = provider
            .acquire_store(context, None, Arc::clone(&embeddings), item_index)
            .await
            .map_err(|e| e.with_operation("update", item_index))?;

        let result = async {
            let processed = process_document(&loader, item, item_index).await?;
            if processed.documents.len() != 1 {
                return Err(Error::invalid_input("Single document per item expected"));
            }

            store
                .add_documents(&processed.documents, Some(&[document_id.clone()]))
                .await?;
            Ok(processed.serialized)
        }
        .await;
        provider.release_store(store.as_ref());

        let serialized = result.map_err(|e| e.with_operation("update", item_index))?;
        records.extend(serialized);

        context.callbacks().ai_event(&AiEvent::VectorStoreUpdated);
        tracing::debug!(
            node = context.node_name(),
            item_index,
            id = %document_id,
            "vector store entry updated"
        );
    }

    Ok(records)
}
