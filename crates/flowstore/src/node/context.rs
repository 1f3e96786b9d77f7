// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Per-invocation execution state supplied by the hosting platform.
//!
//! An [`ExecutionContext`] carries everything one node execution needs:
//! the resolved node parameters, the input items, the connected embedding
//! and reranker capabilities, telemetry callbacks, and the cooperative
//! cancellation flag. It is owned by a single node execution and never
//! shared across concurrent operations.

use crate::core::callbacks::CallbackManager;
use crate::core::embeddings::Embeddings;
use crate::core::error::{Error, Result};
use crate::core::rerankers::Reranker;
use crate::node::loaders::DocumentInput;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Node type version, gating behavioral differences between releases.
///
/// - `1.1` switched insert from per-item population to cross-item batched
///   population and introduced the `embeddingBatchSize` parameter.
/// - `1.3` dropped the `toolName` parameter; the tool name is derived from
///   the node's display name instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeVersion {
    /// Major version component
    pub major: u32,
    /// Minor version component
    pub minor: u32,
}

impl NodeVersion {
    /// Version 1 - per-item population on insert.
    pub const V1: NodeVersion = NodeVersion { major: 1, minor: 0 };
    /// Version 1.1 - batched population on insert.
    pub const V1_1: NodeVersion = NodeVersion { major: 1, minor: 1 };
    /// Version 1.2 - in-memory store changes (no handler impact).
    pub const V1_2: NodeVersion = NodeVersion { major: 1, minor: 2 };
    /// Version 1.3 - tool name derived from node name.
    pub const V1_3: NodeVersion = NodeVersion { major: 1, minor: 3 };

    /// Whether insert accumulates documents across items and populates in
    /// fixed-size batches after the item loop.
    #[must_use]
    pub fn batches_embeddings(self) -> bool {
        self >= Self::V1_1
    }

    /// Whether the retrieve-as-tool name is derived from the node name
    /// instead of the legacy `toolName` parameter.
    #[must_use]
    pub fn derives_tool_name(self) -> bool {
        self >= Self::V1_3
    }
}

impl Default for NodeVersion {
    fn default() -> Self {
        Self::V1_3
    }
}

impl fmt::Display for NodeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.minor == 0 {
            write!(f, "{}", self.major)
        } else {
            write!(f, "{}.{}", self.major, self.minor)
        }
    }
}

/// One input item of a workflow execution: an arbitrary JSON record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExecutionItem {
    /// The item's JSON payload
    pub json: Value,
}

impl ExecutionItem {
    /// Create an item from a JSON payload.
    #[must_use]
    pub fn new(json: Value) -> Self {
        Self { json }
    }
}

/// One output record of a node execution.
///
/// `paired_item` back-references the input item the record was produced
/// from, so the platform can attribute results (and failures) per item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// The record's JSON payload
    pub json: Value,

    /// Index of the originating input item
    #[serde(rename = "pairedItem", skip_serializing_if = "Option::is_none")]
    pub paired_item: Option<usize>,
}

impl ExecutionRecord {
    /// Create a record without item attribution.
    #[must_use]
    pub fn new(json: Value) -> Self {
        Self {
            json,
            paired_item: None,
        }
    }

    /// Create a record attributed to the given input item.
    #[must_use]
    pub fn paired(json: Value, item_index: usize) -> Self {
        Self {
            json,
            paired_item: Some(item_index),
        }
    }
}

/// Resolved node parameters.
///
/// The platform resolves parameter expressions before invoking the node,
/// either to a single value or to one value per input item. Lookup
/// supports dotted paths (`options.metadata`) into nested JSON values.
#[derive(Debug, Clone, Default)]
pub struct NodeParameters {
    values: HashMap<String, ParameterValue>,
}

/// A resolved parameter: one value for all items, or one value per item.
#[derive(Debug, Clone)]
enum ParameterValue {
    Fixed(Value),
    PerItem(Vec<Value>),
}

impl NodeParameters {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter to a single value used for every item.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values
            .insert(name.into(), ParameterValue::Fixed(value.into()));
        self
    }

    /// Set a parameter to one value per input item.
    #[must_use]
    pub fn with_per_item(mut self, name: impl Into<String>, values: Vec<Value>) -> Self {
        self.values
            .insert(name.into(), ParameterValue::PerItem(values));
        self
    }

    /// Look up a parameter value for an item.
    ///
    /// The leading path segment selects the parameter; any further dotted
    /// segments descend into the JSON value.
    #[must_use]
    pub fn get(&self, path: &str, item_index: usize) -> Option<&Value> {
        let mut segments = path.split('.');
        let name = segments.next()?;
        let root = match self.values.get(name)? {
            ParameterValue::Fixed(value) => value,
            ParameterValue::PerItem(values) => values.get(item_index)?,
        };
        segments.try_fold(root, |value, segment| value.get(segment))
    }

    /// Get a required string parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when the parameter is missing,
    /// empty, or not a string.
    pub fn get_string(&self, path: &str, item_index: usize) -> Result<String> {
        match self.get(path, item_index).and_then(Value::as_str) {
            Some(s) if !s.is_empty() => Ok(s.to_string()),
            _ => Err(Error::invalid_input(format!(
                "Required parameter \"{path}\" is missing"
            ))),
        }
    }

    /// Get a string parameter with a default.
    #[must_use]
    pub fn get_string_or(&self, path: &str, item_index: usize, default: &str) -> String {
        self.get(path, item_index)
            .and_then(Value::as_str)
            .map_or_else(|| default.to_string(), ToString::to_string)
    }

    /// Get an unsigned integer parameter with a default.
    #[must_use]
    pub fn get_usize_or(&self, path: &str, item_index: usize, default: usize) -> usize {
        self.get(path, item_index)
            .and_then(Value::as_u64)
            .map_or(default, |v| v as usize)
    }

    /// Get a boolean parameter with a default.
    #[must_use]
    pub fn get_bool_or(&self, path: &str, item_index: usize, default: bool) -> bool {
        self.get(path, item_index)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }
}

/// Cooperative cancellation flag shared with the hosting platform.
///
/// Polled at the top of the insert item loop; never honored mid-item.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    /// Create an unsignalled flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been signalled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Per-invocation execution state.
///
/// Built by the hosting platform (or test harness) and handed to the node
/// entry points. Capability handles (embeddings, reranker, document input)
/// represent the node's connected input ports.
#[derive(Clone)]
pub struct ExecutionContext {
    node_name: String,
    node_version: NodeVersion,
    parameters: NodeParameters,
    items: Vec<ExecutionItem>,
    embeddings: Option<Arc<dyn Embeddings>>,
    reranker: Option<Arc<dyn Reranker>>,
    document_input: Option<DocumentInput>,
    callbacks: CallbackManager,
    cancellation: CancellationFlag,
}

impl ExecutionContext {
    /// Create a context for the named node at the given version.
    #[must_use]
    pub fn new(node_name: impl Into<String>, node_version: NodeVersion) -> Self {
        Self {
            node_name: node_name.into(),
            node_version,
            parameters: NodeParameters::new(),
            items: Vec::new(),
            embeddings: None,
            reranker: None,
            document_input: None,
            callbacks: CallbackManager::new(),
            cancellation: CancellationFlag::new(),
        }
    }

    /// Set the resolved node parameters (builder pattern).
    #[must_use]
    pub fn with_parameters(mut self, parameters: NodeParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set the input items (builder pattern).
    #[must_use]
    pub fn with_items(mut self, items: Vec<ExecutionItem>) -> Self {
        self.items = items;
        self
    }

    /// Connect the embedding capability (builder pattern).
    #[must_use]
    pub fn with_embeddings(mut self, embeddings: Arc<dyn Embeddings>) -> Self {
        self.embeddings = Some(embeddings);
        self
    }

    /// Connect the reranker capability (builder pattern).
    #[must_use]
    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Connect the document input (builder pattern).
    #[must_use]
    pub fn with_document_input(mut self, input: DocumentInput) -> Self {
        self.document_input = Some(input);
        self
    }

    /// Register telemetry callbacks (builder pattern).
    #[must_use]
    pub fn with_callbacks(mut self, callbacks: CallbackManager) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Attach a cancellation flag (builder pattern).
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// The node's display name.
    #[must_use]
    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// The node type version.
    #[must_use]
    pub fn node_version(&self) -> NodeVersion {
        self.node_version
    }

    /// The resolved node parameters.
    #[must_use]
    pub fn parameters(&self) -> &NodeParameters {
        &self.parameters
    }

    /// The input items.
    #[must_use]
    pub fn items(&self) -> &[ExecutionItem] {
        &self.items
    }

    /// The telemetry callback manager.
    #[must_use]
    pub fn callbacks(&self) -> &CallbackManager {
        &self.callbacks
    }

    /// Whether cooperative cancellation has been signalled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// The connected embedding capability.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when no embedding input is
    /// connected.
    pub fn embeddings(&self) -> Result<Arc<dyn Embeddings>> {
        self.embeddings.clone().ok_or_else(|| {
            Error::config("An embedding input is required but none is connected".to_string())
        })
    }

    /// The connected reranker capability.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when reranking was requested but no
    /// reranker input is connected.
    pub fn reranker(&self) -> Result<Arc<dyn Reranker>> {
        self.reranker.clone().ok_or_else(|| {
            Error::config("Rerank Results is enabled but no reranker input is connected")
        })
    }

    /// The connected document input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when no document input is
    /// connected.
    pub fn document_input(&self) -> Result<DocumentInput> {
        self.document_input.clone().ok_or_else(|| {
            Error::config("A document input is required but none is connected".to_string())
        })
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("node_name", &self.node_name)
            .field("node_version", &self.node_version)
            .field("items", &self.items.len())
            .field("has_embeddings", &self.embeddings.is_some())
            .field("has_reranker", &self.reranker.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_version_gates() {
        assert!(!NodeVersion::V1.batches_embeddings());
        assert!(NodeVersion::V1_1.batches_embeddings());
        assert!(NodeVersion::V1_2.batches_embeddings());
        assert!(!NodeVersion::V1_2.derives_tool_name());
        assert!(NodeVersion::V1_3.derives_tool_name());
        assert_eq!(NodeVersion::V1.to_string(), "1");
        assert_eq!(NodeVersion::V1_1.to_string(), "1.1");
    }

    #[test]
    fn test_parameters_dotted_path() {
        let params = NodeParameters::new().with(
            "options",
            json!({"metadata": {"metadataValues": [{"name": "a", "value": 1}]}}),
        );
        let value = params.get("options.metadata", 0).unwrap();
        assert!(value.get("metadataValues").is_some());
        assert!(params.get("options.missing", 0).is_none());
    }

    #[test]
    fn test_parameters_per_item_resolution() {
        let params =
            NodeParameters::new().with_per_item("id", vec![json!("first"), json!("second")]);
        assert_eq!(params.get_string("id", 0).unwrap(), "first");
        assert_eq!(params.get_string("id", 1).unwrap(), "second");
        assert!(params.get_string("id", 2).is_err());
    }

    #[test]
    fn test_parameters_typed_defaults() {
        let params = NodeParameters::new()
            .with("topK", 7)
            .with("useReranker", true);
        assert_eq!(params.get_usize_or("topK", 0, 4), 7);
        assert_eq!(params.get_usize_or("missing", 0, 4), 4);
        assert!(params.get_bool_or("useReranker", 0, false));
        assert!(!params.get_bool_or("missing", 0, false));
    }

    #[test]
    fn test_required_string_rejects_empty() {
        let params = NodeParameters::new().with("prompt", "");
        assert!(params.get_string("prompt", 0).is_err());
    }

    #[test]
    fn test_cancellation_flag_shared() {
        let flag = CancellationFlag::new();
        let ctx = ExecutionContext::new("Test Node", NodeVersion::V1_3)
            .with_cancellation(flag.clone());
        assert!(!ctx.is_cancelled());
        flag.cancel();
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn test_missing_capabilities_are_configuration_errors() {
        let ctx = ExecutionContext::new("Test Node", NodeVersion::V1_3);
        assert!(matches!(
            ctx.embeddings(),
            Err(crate::core::error::Error::Configuration(_))
        ));
        assert!(matches!(
            ctx.reranker(),
            Err(crate::core::error::Error::Configuration(_))
        ));
        assert!(matches!(
            ctx.document_input(),
            Err(crate::core::error::Error::Configuration(_))
        ));
    }
}
