//! Recording callback handler for asserting telemetry.

use flowstore::core::callbacks::{AiEvent, CallbackHandler};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Callback handler that records every event as a string marker.
///
/// AI events record as their wire name; tool traces record as
/// `start:<tool>:<input>:<index>`, `end:<index>` and
/// `error:<index>:<message>` markers. Tests assert on the marker sequence.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    events: Mutex<Vec<String>>,
    counter: AtomicUsize,
}

impl RecordingHandler {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The markers recorded so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("recording lock poisoned").clone()
    }

    fn push(&self, marker: String) {
        self.events
            .lock()
            .expect("recording lock poisoned")
            .push(marker);
    }
}

impl CallbackHandler for RecordingHandler {
    fn on_ai_event(&self, event: &AiEvent) {
        self.push(event.name().to_string());
    }

    fn on_tool_start(&self, tool_name: &str, input: &str) -> Option<usize> {
        let index = self.counter.fetch_add(1, Ordering::Relaxed);
        self.push(format!("start:{tool_name}:{input}:{index}"));
        Some(index)
    }

    fn on_tool_end(&self, index: usize, _output: &Value) {
        self.push(format!("end:{index}"));
    }

    fn on_tool_error(&self, index: usize, error: &str) {
        self.push(format!("error:{index}:{error}"));
    }
}
