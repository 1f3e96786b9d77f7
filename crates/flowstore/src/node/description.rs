// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Declared node interface: ports and parameter fields per operation mode.
//!
//! The hosting platform renders the node from this description; the
//! operation handlers rely on it as the contract for which parameters
//! exist in which mode. Behavior lives in the handlers, not here.

use crate::node::context::NodeVersion;
use crate::node::OperationMode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Connection types between nodes on the hosting platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionType {
    /// Regular workflow data
    Main,
    /// Embedding capability
    AiEmbedding,
    /// Document loader
    AiDocument,
    /// Reranker capability
    AiReranker,
    /// Agent tool
    AiTool,
    /// Vector store handle
    AiVectorStore,
}

/// One input port of the node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputPort {
    /// Port label shown to the user
    pub display_name: &'static str,
    /// Connection type accepted on this port
    pub connection: ConnectionType,
    /// Whether a connection is required
    pub required: bool,
    /// Maximum number of connections, if limited
    pub max_connections: Option<u32>,
}

impl InputPort {
    fn required(display_name: &'static str, connection: ConnectionType) -> Self {
        Self {
            display_name,
            connection,
            required: true,
            max_connections: Some(1),
        }
    }

    fn main() -> Self {
        Self {
            display_name: "",
            connection: ConnectionType::Main,
            required: false,
            max_connections: None,
        }
    }
}

/// Input ports for a mode, as a function of the reranker toggle.
///
/// Every mode takes an embedding input. Modes that search take an optional
/// reranker input when the user enables reranking; execute-style modes take
/// a main input; insert additionally takes a document input.
#[must_use]
pub fn inputs_for_mode(mode: OperationMode, use_reranker: bool) -> Vec<InputPort> {
    let mut inputs = vec![InputPort::required("Embedding", ConnectionType::AiEmbedding)];

    let searches = matches!(
        mode,
        OperationMode::Load | OperationMode::Retrieve | OperationMode::RetrieveAsTool
    );
    if searches && use_reranker {
        inputs.push(InputPort::required("Reranker", ConnectionType::AiReranker));
    }

    if mode == OperationMode::RetrieveAsTool {
        return inputs;
    }

    if matches!(
        mode,
        OperationMode::Insert | OperationMode::Load | OperationMode::Update
    ) {
        inputs.push(InputPort::main());
    }

    if mode == OperationMode::Insert {
        inputs.push(InputPort::required("Document", ConnectionType::AiDocument));
    }

    inputs
}

/// Output connection for a mode.
#[must_use]
pub fn output_for_mode(mode: OperationMode) -> ConnectionType {
    match mode {
        OperationMode::RetrieveAsTool => ConnectionType::AiTool,
        OperationMode::Retrieve => ConnectionType::AiVectorStore,
        OperationMode::Load | OperationMode::Insert | OperationMode::Update => ConnectionType::Main,
    }
}

/// Parameter field kinds understood by the platform renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    /// Free-form string
    String,
    /// Numeric value
    Number,
    /// Boolean toggle
    Boolean,
    /// Selection from [`NodeProperty::options`]
    Options,
    /// Repeatable name/value collection
    FixedCollection,
}

/// One declared parameter field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeProperty {
    /// Field label
    pub display_name: String,
    /// Parameter name read by the handlers
    pub name: String,
    /// Field kind
    pub kind: PropertyKind,
    /// Default value
    pub default: Value,
    /// Whether the user must fill the field
    pub required: bool,
    /// Help text
    pub description: String,
    /// Modes in which the field is shown (empty = all)
    pub modes: Vec<OperationMode>,
    /// Minimum node version showing the field
    pub min_version: Option<NodeVersion>,
    /// Maximum node version showing the field
    pub max_version: Option<NodeVersion>,
    /// Choices for [`PropertyKind::Options`] fields
    pub options: Vec<OperationModeOption>,
}

impl NodeProperty {
    fn new(
        display_name: &str,
        name: &str,
        kind: PropertyKind,
        default: Value,
        description: &str,
    ) -> Self {
        Self {
            display_name: display_name.to_string(),
            name: name.to_string(),
            kind,
            default,
            required: false,
            description: description.to_string(),
            modes: Vec::new(),
            min_version: None,
            max_version: None,
            options: Vec::new(),
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn for_modes(mut self, modes: &[OperationMode]) -> Self {
        self.modes = modes.to_vec();
        self
    }

    fn since(mut self, version: NodeVersion) -> Self {
        self.min_version = Some(version);
        self
    }

    fn until(mut self, version: NodeVersion) -> Self {
        self.max_version = Some(version);
        self
    }

    /// Whether this field is visible for the given mode and version.
    #[must_use]
    pub fn visible(&self, mode: OperationMode, version: NodeVersion) -> bool {
        if !self.modes.is_empty() && !self.modes.contains(&mode) {
            return false;
        }
        if let Some(min) = self.min_version {
            if version < min {
                return false;
            }
        }
        if let Some(max) = self.max_version {
            if version > max {
                return false;
            }
        }
        true
    }
}

/// One selectable operation mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationModeOption {
    /// Option label
    pub name: &'static str,
    /// The mode value
    pub value: OperationMode,
    /// Help text
    pub description: &'static str,
    /// Action phrase shown in the node picker
    pub action: &'static str,
}

/// All known operation modes with their user-facing descriptions.
pub const OPERATION_MODE_DESCRIPTIONS: [OperationModeOption; 5] = [
    OperationModeOption {
        name: "Get Many",
        value: OperationMode::Load,
        description: "Get many ranked documents from vector store for query",
        action: "Get ranked documents from vector store",
    },
    OperationModeOption {
        name: "Insert Documents",
        value: OperationMode::Insert,
        description: "Insert documents into vector store",
        action: "Add documents to vector store",
    },
    OperationModeOption {
        name: "Retrieve Documents (As Vector Store for Chain/Tool)",
        value: OperationMode::Retrieve,
        description: "Retrieve documents from vector store to be used as vector store with AI nodes",
        action: "Retrieve documents for Chain/Tool as Vector Store",
    },
    OperationModeOption {
        name: "Retrieve Documents (As Tool for AI Agent)",
        value: OperationMode::RetrieveAsTool,
        description: "Retrieve documents from vector store to be used as tool with AI nodes",
        action: "Retrieve documents for AI Agent as Tool",
    },
    OperationModeOption {
        name: "Update Documents",
        value: OperationMode::Update,
        description: "Update documents in vector store by ID",
        action: "Update vector store documents",
    },
];

/// The mode options offered for a backend's enabled mode set, in the
/// canonical presentation order.
#[must_use]
pub fn operation_mode_options(enabled: &[OperationMode]) -> Vec<OperationModeOption> {
    OPERATION_MODE_DESCRIPTIONS
        .iter()
        .filter(|option| enabled.contains(&option.value))
        .cloned()
        .collect()
}

/// Restrict a backend-supplied field set to the given modes.
#[must_use]
pub fn fields_for_modes(fields: Vec<NodeProperty>, modes: &[OperationMode]) -> Vec<NodeProperty> {
    fields
        .into_iter()
        .map(|field| field.for_modes(modes))
        .collect()
}

/// The standard parameter fields shared by every vector store node,
/// independent of backend-specific fields.
#[must_use]
pub fn standard_properties(enabled_modes: &[OperationMode]) -> Vec<NodeProperty> {
    let mut mode_field = NodeProperty::new(
        "Operation Mode",
        "mode",
        PropertyKind::Options,
        Value::from("retrieve"),
        "",
    );
    mode_field.options = operation_mode_options(enabled_modes);

    vec![
        mode_field,
        NodeProperty::new(
            "Name",
            "toolName",
            PropertyKind::String,
            Value::from(""),
            "Name of the vector store",
        )
        .required()
        .for_modes(&[OperationMode::RetrieveAsTool])
        .until(NodeVersion::V1_2),
        NodeProperty::new(
            "Description",
            "toolDescription",
            PropertyKind::String,
            Value::from(""),
            "Explain to the LLM what this tool does, a good, specific description allows LLMs to produce expected results much more often",
        )
        .required()
        .for_modes(&[OperationMode::RetrieveAsTool]),
        NodeProperty::new(
            "Embedding Batch Size",
            "embeddingBatchSize",
            PropertyKind::Number,
            Value::from(200),
            "Number of documents to embed in a single batch",
        )
        .for_modes(&[OperationMode::Insert])
        .since(NodeVersion::V1_1),
        NodeProperty::new(
            "Prompt",
            "prompt",
            PropertyKind::String,
            Value::from(""),
            "Search prompt to retrieve matching documents from the vector store using similarity-based ranking",
        )
        .required()
        .for_modes(&[OperationMode::Load]),
        NodeProperty::new(
            "Limit",
            "topK",
            PropertyKind::Number,
            Value::from(4),
            "Number of top results to fetch from vector store",
        )
        .for_modes(&[OperationMode::Load, OperationMode::RetrieveAsTool]),
        NodeProperty::new(
            "Include Metadata",
            "includeDocumentMetadata",
            PropertyKind::Boolean,
            Value::from(true),
            "Whether or not to include document metadata",
        )
        .for_modes(&[OperationMode::Load, OperationMode::RetrieveAsTool]),
        NodeProperty::new(
            "Rerank Results",
            "useReranker",
            PropertyKind::Boolean,
            Value::from(false),
            "Whether or not to rerank results",
        )
        .for_modes(&[
            OperationMode::Load,
            OperationMode::Retrieve,
            OperationMode::RetrieveAsTool,
        ]),
        NodeProperty::new(
            "ID",
            "id",
            PropertyKind::String,
            Value::from(""),
            "ID of an embedding entry",
        )
        .required()
        .for_modes(&[OperationMode::Update]),
    ]
}

/// Derive a tool name from a node display name.
///
/// Runs of non-alphanumeric characters collapse to a single underscore;
/// leading/trailing underscores are trimmed. Used by node versions that
/// dropped the explicit `toolName` parameter.
#[must_use]
pub fn node_name_to_tool_name(node_name: &str) -> String {
    let mut result = String::with_capacity(node_name.len());
    let mut last_was_separator = false;
    for c in node_name.chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            last_was_separator = false;
        } else if !last_was_separator && !result.is_empty() {
            result.push('_');
            last_was_separator = true;
        }
    }
    result.trim_end_matches('_').to_string()
}
