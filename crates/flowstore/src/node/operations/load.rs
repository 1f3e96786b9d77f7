// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Get Many: similarity search per input item.

use super::search_scored;
use crate::core::callbacks::AiEvent;
use crate::core::documents::Document;
use crate::core::error::Result;
use crate::core::vector_stores::VectorStoreProvider;
use crate::node::context::{ExecutionContext, ExecutionRecord};
use crate::node::filters::metadata_filters_from_parameters;
use serde_json::json;
use std::sync::Arc;

fn serialize_hit(
    document: &Document,
    score: f32,
    include_metadata: bool,
    item_index: usize,
) -> ExecutionRecord {
    let doc_json = if include_metadata {
        json!({
            "pageContent": document.page_content,
            "metadata": document.metadata,
        })
    } else {
        json!({ "pageContent": document.page_content })
    };
    ExecutionRecord::paired(json!({ "document": doc_json, "score": score }), item_index)
}

/// Run the load operation over all input items.
///
/// Each item searches independently with its own prompt and filter; every
/// hit becomes one output record `{document, score}` attributed to its
/// source item. Hits keep the order the store (or reranker) produced.
pub async fn execute(
    provider: &dyn VectorStoreProvider,
    context: &ExecutionContext,
) -> Result<Vec<ExecutionRecord>> {
    let embeddings = context.embeddings()?;
    let mut records = Vec::new();

    for item_index in 0..context.items().len() {
        let params = context.parameters();
        let prompt = params
            .get_string("prompt", item_index)
            .map_err(|e| e.with_operation("load", item_index))?;
        let top_k = params.get_usize_or("topK", item_index, 4);
        let use_reranker = params.get_bool_or("useReranker", item_index, false);
        let include_metadata = params.get_bool_or("includeDocumentMetadata", item_index, true);

        let reranker = if use_reranker {
            Some(
                context
                    .reranker()
                    .map_err(|e| e.with_operation("load", item_index))?,
            )
        } else {
            None
        };

        // The filter is applied per search call; acquisition gets none.
        let filter = metadata_filters_from_parameters(context, item_index);
        let store = provider
            .acquire_store(context, None, Arc::clone(&embeddings), item_index)
            .await
            .map_err(|e| e.with_operation("load", item_index))?;

        let result = search_scored(
            store.as_ref(),
            embeddings.as_ref(),
            reranker.as_ref(),
            &prompt,
            top_k,
            filter.as_ref(),
        )
        .await;
        provider.release_store(store.as_ref());

        let hits = result.map_err(|e| e.with_operation("load", item_index))?;
        records.extend(
            hits.iter()
                .map(|(doc, score)| serialize_hit(doc, *score, include_metadata, item_index)),
        );

        context
            .callbacks()
            .ai_event(&AiEvent::VectorStoreSearched {
                query: prompt.clone(),
            });
        tracing::debug!(
            node = context.node_name(),
            item_index,
            hits = hits.len(),
            "vector store searched"
        );
    }

    Ok(records)
}
