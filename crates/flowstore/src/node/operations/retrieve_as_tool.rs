// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Retrieve as Tool: supply an agent tool that searches the store.
//!
//! Unlike the retrieve mode the store is not held open: every tool
//! invocation runs a full acquire/search/release cycle, so the tool stays
//! valid for the whole agent session without pinning a connection.

use super::search_scored;
use crate::core::embeddings::Embeddings;
use crate::core::error::Result;
use crate::core::rerankers::Reranker;
use crate::core::tools::{Tool, ToolContent};
use crate::core::vector_stores::{MetadataFilter, VectorStoreProvider};
use crate::node::context::ExecutionContext;
use crate::node::description::node_name_to_tool_name;
use crate::node::filters::metadata_filters_from_parameters;
use crate::node::log_wrapper::LoggedTool;
use crate::node::{SuppliedResource, SupplyOutput};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

/// Agent tool backed by a vector store similarity search.
struct VectorStoreQueryTool {
    name: String,
    description: String,
    provider: Arc<dyn VectorStoreProvider>,
    context: ExecutionContext,
    embeddings: Arc<dyn Embeddings>,
    reranker: Option<Arc<dyn Reranker>>,
    filter: Option<MetadataFilter>,
    top_k: usize,
    include_metadata: bool,
    item_index: usize,
}

#[async_trait]
impl Tool for VectorStoreQueryTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn call(&self, input: &str) -> Result<serde_json::Value> {
        let store = self
            .provider
            .acquire_store(
                &self.context,
                self.filter.as_ref(),
                Arc::clone(&self.embeddings),
                self.item_index,
            )
            .await?;

        let result = search_scored(
            store.as_ref(),
            self.embeddings.as_ref(),
            self.reranker.as_ref(),
            input,
            self.top_k,
            self.filter.as_ref(),
        )
        .await;
        self.provider.release_store(store.as_ref());

        let hits = result?;
        let content: Vec<ToolContent> = hits
            .iter()
            .map(|(doc, _)| {
                let text = if self.include_metadata {
                    serde_json::to_string(doc)
                } else {
                    serde_json::to_string(&json!({ "pageContent": doc.page_content }))
                }?;
                Ok(ToolContent::text(text))
            })
            .collect::<Result<_>>()?;

        Ok(serde_json::to_value(content)?)
    }
}

/// Supply a search tool for agent consumers.
///
/// The tool name comes from the `toolName` parameter on legacy node
/// versions, and is derived from the node's display name from 1.3 on. The
/// description is always the required `toolDescription` parameter.
pub async fn supply(
    provider: Arc<dyn VectorStoreProvider>,
    context: &ExecutionContext,
    item_index: usize,
) -> Result<SupplyOutput> {
    let params = context.parameters();
    let description = params.get_string("toolDescription", item_index)?;
    let name = if context.node_version().derives_tool_name() {
        node_name_to_tool_name(context.node_name())
    } else {
        params.get_string("toolName", item_index)?
    };

    let embeddings = context.embeddings()?;
    let use_reranker = params.get_bool_or("useReranker", item_index, false);
    let reranker = if use_reranker {
        Some(context.reranker()?)
    } else {
        None
    };

    let tool = VectorStoreQueryTool {
        name,
        description,
        provider,
        embeddings,
        reranker,
        filter: metadata_filters_from_parameters(context, item_index),
        top_k: params.get_usize_or("topK", item_index, 4),
        include_metadata: params.get_bool_or("includeDocumentMetadata", item_index, true),
        item_index,
        context: context.clone(),
    };

    let logged = LoggedTool::new(Arc::new(tool), context.callbacks().clone());
    Ok(SupplyOutput::new(SuppliedResource::Tool(Arc::new(logged))))
}
