// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! The vector store node: one generic node, many backends.
//!
//! A [`VectorStoreNode`] binds a backend adapter ([`VectorStoreProvider`])
//! and static [`NodeMeta`] into a workflow node with five operation modes.
//! Execute-style modes (load, insert, update) run through [`VectorStoreNode::execute`]
//! and produce output records; supply-style modes (retrieve,
//! retrieve-as-tool) run through [`VectorStoreNode::supply_data`] and
//! produce a long-lived resource.

pub mod context;
pub mod description;
pub mod filters;
pub mod loaders;
pub mod log_wrapper;
pub mod operations;
pub mod processing;

use crate::core::error::{Error, Result};
use crate::core::rerankers::Reranker;
use crate::core::tools::Tool;
use crate::core::vector_stores::{VectorStore, VectorStoreProvider};
use crate::node::context::{ExecutionContext, ExecutionRecord, NodeVersion};
use crate::node::description::{standard_properties, NodeProperty};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Node type versions this node implements, oldest first.
pub const SUPPORTED_VERSIONS: [NodeVersion; 4] = [
    NodeVersion::V1,
    NodeVersion::V1_1,
    NodeVersion::V1_2,
    NodeVersion::V1_3,
];

/// The five operation modes of a vector store node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationMode {
    /// Similarity search returning ranked documents as workflow data
    Load,
    /// Embed and persist documents from the input items
    Insert,
    /// Overwrite store entries by external id
    Update,
    /// Supply a live store handle to chain consumers
    Retrieve,
    /// Supply a search tool to agent consumers
    RetrieveAsTool,
}

impl OperationMode {
    /// The mode's wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OperationMode::Load => "load",
            OperationMode::Insert => "insert",
            OperationMode::Update => "update",
            OperationMode::Retrieve => "retrieve",
            OperationMode::RetrieveAsTool => "retrieve-as-tool",
        }
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "load" => Ok(OperationMode::Load),
            "insert" => Ok(OperationMode::Insert),
            "update" => Ok(OperationMode::Update),
            "retrieve" => Ok(OperationMode::Retrieve),
            "retrieve-as-tool" => Ok(OperationMode::RetrieveAsTool),
            other => Err(Error::invalid_input(format!(
                "Unknown operation mode \"{other}\""
            ))),
        }
    }
}

/// Static description of a concrete vector store node type.
///
/// Backend crates build one of these alongside their
/// [`VectorStoreProvider`] implementation.
#[derive(Debug, Clone)]
pub struct NodeMeta {
    /// Display name shown to users
    pub display_name: String,
    /// Machine name of the node type
    pub name: String,
    /// Short description of the backend
    pub description: String,
    /// Icon identifier, if any
    pub icon: Option<String>,
    /// Operation modes the backend supports
    pub operation_modes: Vec<OperationMode>,
    /// Backend-specific parameter fields, already mode-restricted
    pub fields: Vec<NodeProperty>,
}

impl NodeMeta {
    /// Whether the backend declares the given operation mode.
    #[must_use]
    pub fn supports(&self, mode: OperationMode) -> bool {
        self.operation_modes.contains(&mode)
    }

    /// The complete parameter field list: the shared fields for the
    /// enabled modes followed by the backend-specific fields.
    #[must_use]
    pub fn properties(&self) -> Vec<NodeProperty> {
        let mut properties = standard_properties(&self.operation_modes);
        properties.extend(self.fields.iter().cloned());
        properties
    }
}

/// A resource produced by a supply-style operation mode.
pub enum SuppliedResource {
    /// A store handle for chain consumers
    VectorStore(Arc<dyn VectorStore>),
    /// A store handle bundled with the reranker to apply on its results
    RerankedVectorStore {
        /// The store handle
        vector_store: Arc<dyn VectorStore>,
        /// Reranker for post-processing search results
        reranker: Arc<dyn Reranker>,
    },
    /// A search tool for agent consumers
    Tool(Arc<dyn Tool>),
}

impl fmt::Debug for SuppliedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuppliedResource::VectorStore(_) => f.write_str("VectorStore"),
            SuppliedResource::RerankedVectorStore { .. } => f.write_str("RerankedVectorStore"),
            SuppliedResource::Tool(tool) => f.debug_tuple("Tool").field(&tool.name()).finish(),
        }
    }
}

/// A supplied resource plus its teardown.
///
/// Consumers use the resource for as long as they need it, then call
/// [`SupplyOutput::close`]. Dropping the output without closing runs the
/// teardown as well, so a handle is never leaked past the output's scope.
pub struct SupplyOutput {
    /// The supplied resource
    pub resource: SuppliedResource,
    close: Option<Box<dyn FnOnce() + Send>>,
}

impl SupplyOutput {
    /// An output with no teardown.
    #[must_use]
    pub fn new(resource: SuppliedResource) -> Self {
        Self {
            resource,
            close: None,
        }
    }

    /// An output whose teardown runs on close (or drop).
    #[must_use]
    pub fn with_close(resource: SuppliedResource, close: impl FnOnce() + Send + 'static) -> Self {
        Self {
            resource,
            close: Some(Box::new(close)),
        }
    }

    /// Run the teardown and consume the output.
    pub fn close(mut self) {
        if let Some(close) = self.close.take() {
            close();
        }
    }
}

impl Drop for SupplyOutput {
    fn drop(&mut self) {
        if let Some(close) = self.close.take() {
            close();
        }
    }
}

impl fmt::Debug for SupplyOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupplyOutput")
            .field("resource", &self.resource)
            .field("has_close", &self.close.is_some())
            .finish()
    }
}

/// A vector store workflow node bound to one backend adapter.
pub struct VectorStoreNode {
    meta: NodeMeta,
    provider: Arc<dyn VectorStoreProvider>,
}

impl VectorStoreNode {
    /// Build a node from backend metadata and its adapter.
    #[must_use]
    pub fn new(meta: NodeMeta, provider: Arc<dyn VectorStoreProvider>) -> Self {
        Self { meta, provider }
    }

    /// The node's static metadata.
    #[must_use]
    pub fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    /// The backend adapter.
    #[must_use]
    pub fn provider(&self) -> &Arc<dyn VectorStoreProvider> {
        &self.provider
    }

    fn operation_mode(context: &ExecutionContext) -> Result<OperationMode> {
        context
            .parameters()
            .get_string_or("mode", 0, "retrieve")
            .parse()
    }

    /// Run an execute-style operation over the context's input items.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an unknown mode string,
    /// [`Error::Configuration`] for supply-style modes or for an update
    /// against a backend that does not declare the mode, and otherwise
    /// whatever the handler produced, wrapped with the operation name and
    /// failing item index.
    pub async fn execute(&self, context: &ExecutionContext) -> Result<Vec<ExecutionRecord>> {
        let mode = Self::operation_mode(context)?;
        tracing::debug!(
            node = context.node_name(),
            version = %context.node_version(),
            %mode,
            items = context.items().len(),
            "executing vector store operation"
        );

        match mode {
            OperationMode::Load => operations::load::execute(self.provider.as_ref(), context).await,
            OperationMode::Insert => {
                operations::insert::execute(self.provider.as_ref(), context).await
            }
            OperationMode::Update => {
                if !self.meta.supports(OperationMode::Update) {
                    return Err(Error::config(
                        "Update operation is not implemented for this Vector Store",
                    ));
                }
                operations::update::execute(self.provider.as_ref(), context).await
            }
            OperationMode::Retrieve | OperationMode::RetrieveAsTool => Err(Error::config(
                "Only the \"load\", \"insert\" and \"update\" operation modes are supported with execute",
            )),
        }
    }

    /// Run a supply-style operation, producing a long-lived resource.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an unknown mode string and
    /// [`Error::Configuration`] for execute-style modes.
    pub async fn supply_data(
        &self,
        context: &ExecutionContext,
        item_index: usize,
    ) -> Result<SupplyOutput> {
        let mode = Self::operation_mode(context)?;
        tracing::debug!(
            node = context.node_name(),
            version = %context.node_version(),
            %mode,
            "supplying vector store resource"
        );

        match mode {
            OperationMode::Retrieve => {
                operations::retrieve::supply(Arc::clone(&self.provider), context, item_index).await
            }
            OperationMode::RetrieveAsTool => {
                operations::retrieve_as_tool::supply(Arc::clone(&self.provider), context, item_index)
                    .await
            }
            OperationMode::Load | OperationMode::Insert | OperationMode::Update => {
                Err(Error::config(
                    "Only the \"retrieve\" and \"retrieve-as-tool\" operation modes are supported with supply_data",
                ))
            }
        }
    }
}

impl fmt::Debug for VectorStoreNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorStoreNode")
            .field("name", &self.meta.name)
            .field("operation_modes", &self.meta.operation_modes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::embeddings::Embeddings;
    use crate::core::vector_stores::MetadataFilter;
    use crate::node::context::NodeParameters;
    use async_trait::async_trait;

    struct RefusingProvider;

    #[async_trait]
    impl VectorStoreProvider for RefusingProvider {
        async fn acquire_store(
            &self,
            _context: &ExecutionContext,
            _filter: Option<&MetadataFilter>,
            _embeddings: Arc<dyn Embeddings>,
            _item_index: usize,
        ) -> Result<Arc<dyn VectorStore>> {
            Err(Error::store("no backend in this test"))
        }

        async fn populate_store(
            &self,
            _context: &ExecutionContext,
            _embeddings: Arc<dyn Embeddings>,
            _documents: &[crate::core::documents::Document],
            _item_index: usize,
        ) -> Result<()> {
            Err(Error::store("no backend in this test"))
        }
    }

    fn node(modes: Vec<OperationMode>) -> VectorStoreNode {
        VectorStoreNode::new(
            NodeMeta {
                display_name: "Test Store".to_string(),
                name: "testStore".to_string(),
                description: "test backend".to_string(),
                icon: None,
                operation_modes: modes,
                fields: Vec::new(),
            },
            Arc::new(RefusingProvider),
        )
    }

    fn context_with_mode(mode: &str) -> ExecutionContext {
        ExecutionContext::new("Test Store", NodeVersion::V1_3)
            .with_parameters(NodeParameters::new().with("mode", mode))
    }

    #[test]
    fn test_operation_mode_round_trip() {
        for mode in [
            OperationMode::Load,
            OperationMode::Insert,
            OperationMode::Update,
            OperationMode::Retrieve,
            OperationMode::RetrieveAsTool,
        ] {
            assert_eq!(mode.as_str().parse::<OperationMode>().unwrap(), mode);
        }
        assert!("delete".parse::<OperationMode>().is_err());
    }

    #[test]
    fn test_operation_mode_serde_kebab() {
        let json = serde_json::to_string(&OperationMode::RetrieveAsTool).unwrap();
        assert_eq!(json, "\"retrieve-as-tool\"");
    }

    #[tokio::test]
    async fn test_execute_rejects_supply_modes() {
        let err = node(vec![OperationMode::Retrieve])
            .execute(&context_with_mode("retrieve"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[tokio::test]
    async fn test_supply_rejects_execute_modes() {
        let err = node(vec![OperationMode::Load])
            .supply_data(&context_with_mode("load"), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[tokio::test]
    async fn test_unknown_mode_is_invalid_input() {
        let err = node(vec![OperationMode::Load])
            .execute(&context_with_mode("delete"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(err.to_string().contains("delete"));
    }

    #[tokio::test]
    async fn test_update_gated_on_declared_modes() {
        let err = node(vec![OperationMode::Load, OperationMode::Insert])
            .execute(&context_with_mode("update"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err
            .to_string()
            .contains("Update operation is not implemented"));
    }

    #[test]
    fn test_meta_properties_include_standard_and_backend_fields() {
        let mut meta = node(vec![OperationMode::Load]).meta.clone();
        meta.fields = vec![description::NodeProperty {
            display_name: "Table Name".to_string(),
            name: "tableName".to_string(),
            kind: description::PropertyKind::String,
            default: serde_json::Value::from(""),
            required: true,
            description: String::new(),
            modes: Vec::new(),
            min_version: None,
            max_version: None,
            options: Vec::new(),
        }];
        let properties = meta.properties();
        assert!(properties.iter().any(|p| p.name == "mode"));
        assert!(properties.iter().any(|p| p.name == "tableName"));
    }
}
