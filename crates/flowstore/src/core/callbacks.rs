// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Callback system for observability
//!
//! Operation handlers emit AI telemetry events ([`AiEvent`]) and tool
//! invocations emit correlated start/end event pairs. The hosting platform
//! registers [`CallbackHandler`]s on the execution context to receive them;
//! [`ConsoleCallbackHandler`] forwards everything to `tracing`.
//!
//! Callbacks are a pure side channel: handlers cannot alter operation
//! results, and a handler that panics is the host's bug, not the node's.

use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// AI telemetry events emitted by the operation handlers.
///
/// Event names are a compatibility contract with the hosting platform's
/// telemetry pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum AiEvent {
    /// A similarity search completed (load mode and tool invocations)
    VectorStoreSearched {
        /// The search prompt
        query: String,
    },
    /// Documents were persisted to the store (insert mode, per item)
    VectorStorePopulated,
    /// A document was updated in place (update mode, per item)
    VectorStoreUpdated,
    /// A vector store tool was invoked by an agent
    ToolCalled {
        /// Tool name
        tool: String,
        /// Agent-supplied input
        query: String,
    },
}

impl AiEvent {
    /// The event's wire name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            AiEvent::VectorStoreSearched { .. } => "ai-vector-store-searched",
            AiEvent::VectorStorePopulated => "ai-vector-store-populated",
            AiEvent::VectorStoreUpdated => "ai-vector-store-updated",
            AiEvent::ToolCalled { .. } => "ai-tool-called",
        }
    }
}

impl fmt::Display for AiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Receives telemetry events from node executions.
///
/// All methods have no-op defaults; handlers implement only what they
/// observe. Tool traces are correlated by the opaque index returned from
/// [`CallbackHandler::on_tool_start`].
pub trait CallbackHandler: Send + Sync {
    /// An AI telemetry event was emitted.
    fn on_ai_event(&self, _event: &AiEvent) {}

    /// A tool invocation started with the given input.
    ///
    /// Returns an opaque index token correlating the matching
    /// `on_tool_end`/`on_tool_error` call, or `None` if this handler does
    /// not trace tools.
    fn on_tool_start(&self, _tool_name: &str, _input: &str) -> Option<usize> {
        None
    }

    /// The tool invocation identified by `index` succeeded.
    fn on_tool_end(&self, _index: usize, _output: &Value) {}

    /// The tool invocation identified by `index` failed.
    fn on_tool_error(&self, _index: usize, _error: &str) {}
}

/// Fans telemetry out to registered handlers.
///
/// Cheap to clone; handlers are shared. An empty manager is valid and
/// silently drops events.
#[derive(Clone, Default)]
pub struct CallbackManager {
    handlers: Vec<Arc<dyn CallbackHandler>>,
}

impl CallbackManager {
    /// Create an empty callback manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler (builder pattern).
    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn CallbackHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Emit an AI telemetry event to all handlers.
    pub fn ai_event(&self, event: &AiEvent) {
        tracing::debug!(event = event.name(), "ai event");
        for handler in &self.handlers {
            handler.on_ai_event(event);
        }
    }

    /// Open a correlated tool trace across all handlers.
    #[must_use]
    pub fn tool_start(&self, tool_name: &str, input: &str) -> ToolTrace {
        let spans = self
            .handlers
            .iter()
            .filter_map(|handler| {
                handler
                    .on_tool_start(tool_name, input)
                    .map(|index| (Arc::clone(handler), index))
            })
            .collect();
        ToolTrace { spans }
    }
}

impl fmt::Debug for CallbackManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackManager")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// An open tool trace: the start markers already emitted, waiting for
/// their success or error counterpart.
#[must_use = "a tool trace must be finished or failed"]
pub struct ToolTrace {
    spans: Vec<(Arc<dyn CallbackHandler>, usize)>,
}

impl ToolTrace {
    /// Record a successful tool invocation.
    pub fn finish(self, output: &Value) {
        for (handler, index) in self.spans {
            handler.on_tool_end(index, output);
        }
    }

    /// Record a failed tool invocation.
    pub fn fail(self, error: &str) {
        for (handler, index) in self.spans {
            handler.on_tool_error(index, error);
        }
    }
}

/// Callback handler that logs every event through `tracing`.
#[derive(Debug, Default)]
pub struct ConsoleCallbackHandler {
    next_index: AtomicUsize,
}

impl ConsoleCallbackHandler {
    /// Create a new console callback handler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CallbackHandler for ConsoleCallbackHandler {
    fn on_ai_event(&self, event: &AiEvent) {
        match event {
            AiEvent::VectorStoreSearched { query } => {
                tracing::info!(event = event.name(), query, "vector store searched");
            }
            AiEvent::ToolCalled { tool, query } => {
                tracing::info!(event = event.name(), tool, query, "tool called");
            }
            other => tracing::info!(event = other.name(), "ai event"),
        }
    }

    fn on_tool_start(&self, tool_name: &str, input: &str) -> Option<usize> {
        let index = self.next_index.fetch_add(1, Ordering::Relaxed);
        tracing::info!(tool = tool_name, index, input, "tool invocation started");
        Some(index)
    }

    fn on_tool_end(&self, index: usize, output: &Value) {
        tracing::info!(index, %output, "tool invocation finished");
    }

    fn on_tool_error(&self, index: usize, error: &str) {
        tracing::error!(index, error, "tool invocation failed");
    }
}
