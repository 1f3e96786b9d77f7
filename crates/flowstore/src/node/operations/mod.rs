// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Operation handlers, one per operation mode.
//!
//! Execute-style handlers (`load`, `insert`, `update`) consume input items
//! and return output records; supply-style handlers (`retrieve`,
//! `retrieve_as_tool`) return a long-lived resource for downstream
//! consumers. Each handler acquires store handles through the backend
//! adapter and releases them on every exit path.

pub mod insert;
pub mod load;
pub mod retrieve;
pub mod retrieve_as_tool;
pub mod update;

use crate::core::documents::Document;
use crate::core::embeddings::Embeddings;
use crate::core::error::Result;
use crate::core::rerankers::{take_relevance_score, Reranker};
use crate::core::vector_stores::{MetadataFilter, VectorStore};
use std::sync::Arc;

/// Embed a query, search the store, and optionally rerank the hits.
///
/// Shared by the load and retrieve-as-tool handlers. When a reranker is
/// given, the backend scores are replaced by the reranker's relevance
/// scores and the hits are returned in the reranker's order.
pub(crate) async fn search_scored(
    store: &dyn VectorStore,
    embeddings: &dyn Embeddings,
    reranker: Option<&Arc<dyn Reranker>>,
    query: &str,
    top_k: usize,
    filter: Option<&MetadataFilter>,
) -> Result<Vec<(Document, f32)>> {
    let query_vector = embeddings.embed_query(query).await?;
    let hits = store
        .similarity_search_by_vector_with_score(&query_vector, top_k, filter)
        .await?;

    let Some(reranker) = reranker else {
        return Ok(hits);
    };
    if hits.is_empty() {
        return Ok(hits);
    }

    let documents = hits.into_iter().map(|(doc, _)| doc).collect();
    let reranked = reranker.compress_documents(documents, query).await?;
    Ok(reranked.into_iter().map(take_relevance_score).collect())
}
