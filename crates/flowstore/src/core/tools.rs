//! Tool abstraction for AI agent consumption.
//!
//! A tool is a named, described capability an AI agent can invoke with a
//! text input. The retrieve-as-tool operation mode packages a vector store
//! query loop as a tool; the hosting platform hands it to a downstream
//! agent node.

use crate::core::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One content block of a tool response.
///
/// The `{"type": "text", "text": ...}` shape is a compatibility contract
/// with downstream agent consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolContent {
    /// Block type; always `"text"` for vector store results
    #[serde(rename = "type")]
    pub content_type: String,

    /// Block payload (JSON-serialized document)
    pub text: String,
}

impl ToolContent {
    /// Create a text content block.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: "text".to_string(),
            text: text.into(),
        }
    }
}

/// A callable tool exposed to AI agents.
///
/// Each invocation is independent: implementations must not reuse
/// per-call resources (store handles in particular) across calls.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's name, as presented to the agent.
    fn name(&self) -> &str;

    /// Human/LLM-readable description of what the tool does.
    fn description(&self) -> &str;

    /// Invoke the tool with a text input.
    ///
    /// Returns the tool response as a JSON value (for vector store tools,
    /// an array of [`ToolContent`] blocks).
    async fn call(&self, input: &str) -> Result<serde_json::Value>;
}
