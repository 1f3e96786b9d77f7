// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Insert Documents: embed and persist documents from the input items.
//!
//! Two population strategies, gated by node version:
//!
//! - pre-1.1: each item's documents are embedded and persisted immediately
//!   inside the item loop, attributed to that item.
//! - 1.1+: documents accumulate across items and are persisted after the
//!   loop in fixed-size batches, so one embedding call covers documents
//!   from many items.
//!
//! Cancellation is polled at the top of the item loop only. A cancelled
//! run returns the records accumulated so far as a success; work already
//! persisted stays persisted.

use crate::core::callbacks::AiEvent;
use crate::core::error::Result;
use crate::core::vector_stores::VectorStoreProvider;
use crate::node::context::{ExecutionContext, ExecutionRecord};
use crate::node::processing::process_document;
use std::sync::Arc;

/// Run the insert operation over all input items.
pub async fn execute(
    provider: &dyn VectorStoreProvider,
    context: &ExecutionContext,
) -> Result<Vec<ExecutionRecord>> {
    let embeddings = context.embeddings()?;
    let document_input = context.document_input()?;
    let batched = context.node_version().batches_embeddings();

    let mut records = Vec::new();
    let mut pending = Vec::new();

    for (item_index, item) in context.items().iter().enumerate() {
        if context.is_cancelled() {
            tracing::debug!(
                node = context.node_name(),
                item_index,
                "insert cancelled, returning partial results"
            );
            break;
        }

        let processed = process_document(&document_input, item, item_index)
            .await
            .map_err(|e| e.with_operation("insert", item_index))?;
        records.extend(processed.serialized);

        if batched {
            pending.extend(processed.documents);
        } else {
            provider
                .populate_store(
                    context,
                    Arc::clone(&embeddings),
                    &processed.documents,
                    item_index,
                )
                .await
                .map_err(|e| e.with_operation("insert", item_index))?;
        }

        context.callbacks().ai_event(&AiEvent::VectorStorePopulated);
    }

    if batched {
        let batch_size = context
            .parameters()
            .get_usize_or("embeddingBatchSize", 0, 200)
            .max(1);
        for batch in pending.chunks(batch_size) {
            provider
                .populate_store(context, Arc::clone(&embeddings), batch, 0)
                .await
                .map_err(|e| e.with_operation("insert", 0))?;
        }
    }

    Ok(records)
}
