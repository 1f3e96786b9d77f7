//! Test utilities for `FlowStore` integration testing
//!
//! This crate provides shared infrastructure for node and backend tests:
//! - Deterministic mock embeddings (no API keys, no network)
//! - A deterministic mock reranker
//! - A recording callback handler for asserting telemetry events

pub mod mock_embeddings;
pub mod mock_reranker;
pub mod recording;

pub use mock_embeddings::MockEmbeddings;
pub use mock_reranker::MockReranker;
pub use recording::RecordingHandler;
