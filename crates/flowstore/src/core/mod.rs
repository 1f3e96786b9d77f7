// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Core abstractions shared by all vector store backends.
//!
//! # Module Overview
//!
//! - [`documents`] - The document type flowing through stores and tools
//! - [`embeddings`] - Text embedding interface
//! - [`vector_stores`] - Store handle and backend adapter traits
//! - [`rerankers`] - Result reranking interface
//! - [`tools`] - Agent tool interface and content blocks
//! - [`callbacks`] - Telemetry event handling
//! - [`error`] - Error types and handling

pub mod callbacks;
pub mod documents;
pub mod embeddings;
pub mod error;
pub mod rerankers;
pub mod tools;
pub mod vector_stores;

pub use error::{Error, Result};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_smoke_error_roundtrip() {
        let err = Error::invalid_input("bad");
        assert!(matches!(err, Error::InvalidInput(_)));

        let result: Result<()> = Err(err);
        assert!(result.is_err());
    }
}
