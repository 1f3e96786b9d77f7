// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Retrieve: supply a live store handle to a downstream consumer.

use crate::core::error::Result;
use crate::core::vector_stores::{VectorStore, VectorStoreProvider};
use crate::node::context::ExecutionContext;
use crate::node::filters::metadata_filters_from_parameters;
use crate::node::log_wrapper::LoggedVectorStore;
use crate::node::{SuppliedResource, SupplyOutput};
use std::sync::Arc;

/// Supply a vector store handle for chain-style consumers.
///
/// The handle is acquired with the node's metadata filter bound in, wrapped
/// in a logging decorator, and stays open until the returned output is
/// closed. With `useReranker` enabled the connected reranker is bundled
/// alongside the store.
pub async fn supply(
    provider: Arc<dyn VectorStoreProvider>,
    context: &ExecutionContext,
    item_index: usize,
) -> Result<SupplyOutput> {
    let embeddings = context.embeddings()?;
    let filter = metadata_filters_from_parameters(context, item_index);

    let store = provider
        .acquire_store(context, filter.as_ref(), embeddings, item_index)
        .await?;

    let logged: Arc<dyn VectorStore> = Arc::new(LoggedVectorStore::new(
        Arc::clone(&store),
        context.node_name(),
    ));

    let resource = if context
        .parameters()
        .get_bool_or("useReranker", item_index, false)
    {
        SuppliedResource::RerankedVectorStore {
            vector_store: logged,
            reranker: context.reranker()?,
        }
    } else {
        SuppliedResource::VectorStore(logged)
    };

    Ok(SupplyOutput::with_close(resource, move || {
        provider.release_store(store.as_ref());
    }))
}
