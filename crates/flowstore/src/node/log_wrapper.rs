// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Logging decorators for supplied resources.
//!
//! Store handles and tools handed to downstream consumers are wrapped in
//! thin decorators that forward every call unchanged while emitting
//! telemetry: optional entry logs, error logs before propagation, and (for
//! tools) a correlated start/success-or-error event pair through the
//! callback system.
//!
//! Invariant: wrapping never changes call arguments, return values, or
//! errors. The decorators are a pure observability side channel.

use crate::core::callbacks::{AiEvent, CallbackManager};
use crate::core::documents::Document;
use crate::core::error::Result;
use crate::core::tools::Tool;
use crate::core::vector_stores::{MetadataFilter, VectorStore};
use async_trait::async_trait;
use std::sync::Arc;

/// Options controlling decorator verbosity.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Log every method entry at debug level
    pub log_method_calls: bool,
    /// Log errors before propagating them
    pub log_errors: bool,
    /// Prefix for log lines
    pub prefix: &'static str,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            log_method_calls: false,
            log_errors: true,
            prefix: "[Vector Store]",
        }
    }
}

/// [`VectorStore`] decorator that logs calls and errors.
pub struct LoggedVectorStore {
    inner: Arc<dyn VectorStore>,
    node_name: String,
    options: LogOptions,
}

impl LoggedVectorStore {
    /// Wrap a store handle for the named node with default options.
    #[must_use]
    pub fn new(inner: Arc<dyn VectorStore>, node_name: impl Into<String>) -> Self {
        Self::with_options(inner, node_name, LogOptions::default())
    }

    /// Wrap a store handle with explicit options.
    #[must_use]
    pub fn with_options(
        inner: Arc<dyn VectorStore>,
        node_name: impl Into<String>,
        options: LogOptions,
    ) -> Self {
        Self {
            inner,
            node_name: node_name.into(),
            options,
        }
    }

    /// The wrapped handle.
    #[must_use]
    pub fn inner(&self) -> &Arc<dyn VectorStore> {
        &self.inner
    }

    fn log_entry(&self, method: &str) {
        if self.options.log_method_calls {
            tracing::debug!(
                prefix = self.options.prefix,
                node = %self.node_name,
                method,
                "calling method"
            );
        }
    }

    fn log_error(&self, method: &str, error: &crate::core::error::Error) {
        if self.options.log_errors {
            tracing::error!(
                prefix = self.options.prefix,
                node = %self.node_name,
                method,
                %error,
                "method failed"
            );
        }
    }
}

#[async_trait]
impl VectorStore for LoggedVectorStore {
    async fn similarity_search_by_vector_with_score(
        &self,
        embedding: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<(Document, f32)>> {
        self.log_entry("similarity_search_by_vector_with_score");
        let result = self
            .inner
            .similarity_search_by_vector_with_score(embedding, k, filter)
            .await;
        if let Err(error) = &result {
            self.log_error("similarity_search_by_vector_with_score", error);
        }
        result
    }

    async fn add_documents(
        &self,
        documents: &[Document],
        ids: Option<&[String]>,
    ) -> Result<Vec<String>> {
        self.log_entry("add_documents");
        let result = self.inner.add_documents(documents, ids).await;
        if let Err(error) = &result {
            self.log_error("add_documents", error);
        }
        result
    }
}

/// [`Tool`] decorator that records a correlated input/output event pair
/// per invocation.
pub struct LoggedTool {
    inner: Arc<dyn Tool>,
    callbacks: CallbackManager,
    options: LogOptions,
}

impl LoggedTool {
    /// Wrap a tool, routing trace events through `callbacks`.
    #[must_use]
    pub fn new(inner: Arc<dyn Tool>, callbacks: CallbackManager) -> Self {
        Self {
            inner,
            callbacks,
            options: LogOptions {
                prefix: "[AI Tool]",
                ..LogOptions::default()
            },
        }
    }
}

#[async_trait]
impl Tool for LoggedTool {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    async fn call(&self, input: &str) -> Result<serde_json::Value> {
        let trace = self.callbacks.tool_start(self.inner.name(), input);

        match self.inner.call(input).await {
            Ok(output) => {
                self.callbacks.ai_event(&AiEvent::ToolCalled {
                    tool: self.inner.name().to_string(),
                    query: input.to_string(),
                });
                trace.finish(&output);
                Ok(output)
            }
            Err(error) => {
                if self.options.log_errors {
                    tracing::error!(
                        prefix = self.options.prefix,
                        tool = self.inner.name(),
                        %error,
                        "tool invocation failed"
                    );
                }
                trace.fail(&error.to_string());
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::callbacks::CallbackHandler;
    use crate::core::error::Error;
    use proptest::prelude::*;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StubStore {
        fail: bool,
    }

    #[async_trait]
    impl VectorStore for StubStore {
        async fn similarity_search_by_vector_with_score(
            &self,
            embedding: &[f32],
            k: usize,
            _filter: Option<&MetadataFilter>,
        ) -> Result<Vec<(Document, f32)>> {
            if self.fail {
                return Err(Error::store("search failed"));
            }
            // Deterministic output derived from the inputs, to check
            // pass-through fidelity
            Ok((0..k)
                .map(|i| {
                    (
                        Document::new(format!("doc-{i}-{}", embedding.len())),
                        1.0 - i as f32 * 0.1,
                    )
                })
                .collect())
        }
    }

    struct EchoTool {
        fail: bool,
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "echoes its input"
        }

        async fn call(&self, input: &str) -> Result<Value> {
            if self.fail {
                return Err(Error::ToolExecution("echo failed".to_string()));
            }
            Ok(json!({ "echo": input }))
        }
    }

    #[derive(Default)]
    struct RecordingHandler {
        events: Mutex<Vec<String>>,
        counter: AtomicUsize,
    }

    impl CallbackHandler for RecordingHandler {
        fn on_ai_event(&self, event: &AiEvent) {
            self.events.lock().unwrap().push(event.name().to_string());
        }

        fn on_tool_start(&self, tool_name: &str, input: &str) -> Option<usize> {
            let index = self.counter.fetch_add(1, Ordering::Relaxed);
            self.events
                .lock()
                .unwrap()
                .push(format!("start:{tool_name}:{input}:{index}"));
            Some(index)
        }

        fn on_tool_end(&self, index: usize, _output: &Value) {
            self.events.lock().unwrap().push(format!("end:{index}"));
        }

        fn on_tool_error(&self, index: usize, error: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("error:{index}:{error}"));
        }
    }

    #[tokio::test]
    async fn test_logged_store_passes_results_through() {
        let inner: Arc<dyn VectorStore> = Arc::new(StubStore { fail: false });
        let logged = LoggedVectorStore::new(Arc::clone(&inner), "Test Node");

        let embedding = [0.1, 0.2, 0.3];
        let direct = inner
            .similarity_search_by_vector_with_score(&embedding, 3, None)
            .await
            .unwrap();
        let wrapped = logged
            .similarity_search_by_vector_with_score(&embedding, 3, None)
            .await
            .unwrap();

        assert_eq!(direct, wrapped);
    }

    #[tokio::test]
    async fn test_logged_store_propagates_errors_unchanged() {
        let logged = LoggedVectorStore::new(Arc::new(StubStore { fail: true }), "Test Node");
        let err = logged
            .similarity_search_by_vector_with_score(&[0.0], 1, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Store(_)));
        assert!(err.to_string().contains("search failed"));
    }

    #[tokio::test]
    async fn test_logged_tool_records_event_pair() {
        let handler = Arc::new(RecordingHandler::default());
        let callbacks = CallbackManager::new().with_handler(handler.clone());
        let tool = LoggedTool::new(Arc::new(EchoTool { fail: false }), callbacks);

        let output = tool.call("hello").await.unwrap();
        assert_eq!(output, json!({ "echo": "hello" }));

        let events = handler.events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                "start:echo:hello:0".to_string(),
                "ai-tool-called".to_string(),
                "end:0".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_logged_tool_records_error_marker_and_reraises() {
        let handler = Arc::new(RecordingHandler::default());
        let callbacks = CallbackManager::new().with_handler(handler.clone());
        let tool = LoggedTool::new(Arc::new(EchoTool { fail: true }), callbacks);

        let err = tool.call("boom").await.unwrap_err();
        assert!(matches!(err, Error::ToolExecution(_)));

        let events = handler.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].starts_with("start:echo:boom"));
        assert!(events[1].starts_with("error:0:"));
    }

    proptest! {
        // Wrapping must be observationally transparent for any input
        #[test]
        fn prop_logged_tool_is_identity(input in "\\PC*") {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            rt.block_on(async {
                let inner = Arc::new(EchoTool { fail: false });
                let tool = LoggedTool::new(inner.clone(), CallbackManager::new());
                let direct = inner.call(&input).await.unwrap();
                let wrapped = tool.call(&input).await.unwrap();
                prop_assert_eq!(direct, wrapped);
                Ok(())
            })?;
        }
    }
}
