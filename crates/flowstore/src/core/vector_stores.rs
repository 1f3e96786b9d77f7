// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Vector store traits: the store handle and the backend adapter.
//!
//! Two seams separate the node layer from any concrete vector database:
//!
//! - [`VectorStore`] is a live session handle. It exposes the narrow
//!   capability set the operation handlers need: similarity search by
//!   query vector, and (for backends that support the update mode)
//!   `add_documents` with explicit external ids.
//! - [`VectorStoreProvider`] is the backend adapter: it acquires store
//!   handles, populates the store with documents, and releases handles.
//!   One concrete implementation exists per backend.
//!
//! Handle lifecycle: a handler acquires a handle, owns it exclusively for
//! the duration of its scope, and releases it exactly once on every exit
//! path. `release_store` must be safe to call on an already-released
//! handle.

use crate::core::documents::Document;
use crate::core::embeddings::Embeddings;
use crate::core::error::{Error, Result};
use crate::node::context::ExecutionContext;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Metadata filter passed to similarity search and store acquisition.
///
/// A flat field -> value map; a document matches when every entry equals
/// the corresponding metadata value.
pub type MetadataFilter = HashMap<String, serde_json::Value>;

/// A live session handle to a vector store backend.
///
/// Handles are acquired from a [`VectorStoreProvider`] and must be released
/// through it. All methods take `&self`; backends needing mutability use
/// interior locking.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Search for the `k` most similar documents to a query vector.
    ///
    /// Returns `(document, score)` pairs in descending relevance order as
    /// produced by the backend; callers do not re-sort.
    async fn similarity_search_by_vector_with_score(
        &self,
        embedding: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<(Document, f32)>>;

    /// Add documents to the store under explicit external ids.
    ///
    /// Only required for backends that declare support for the update
    /// operation mode. When `ids` is `None`, backends generate ids.
    ///
    /// Returns the ids of the added documents.
    async fn add_documents(
        &self,
        _documents: &[Document],
        _ids: Option<&[String]>,
    ) -> Result<Vec<String>> {
        Err(Error::NotImplemented(
            "add_documents not implemented for this vector store".to_string(),
        ))
    }
}

/// Backend adapter: acquisition, population and release of store handles.
///
/// The node factory is generic over this trait; the concrete adapter
/// (in-memory, SAP HANA, ...) supplies connection handling and credential
/// validation behind it.
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Open a store session for one operation.
    ///
    /// `filter` is passed at acquisition time because some backends bind
    /// the filter into the constructed store; others ignore it here and
    /// take it per search call instead.
    ///
    /// # Errors
    ///
    /// Returns a descriptive [`Error::Store`] if the connection or
    /// credential validation fails.
    async fn acquire_store(
        &self,
        context: &ExecutionContext,
        filter: Option<&MetadataFilter>,
        embeddings: Arc<dyn Embeddings>,
        item_index: usize,
    ) -> Result<Arc<dyn VectorStore>>;

    /// Embed and persist `documents`.
    ///
    /// Not guaranteed idempotent per call; callers must avoid
    /// double-population.
    async fn populate_store(
        &self,
        context: &ExecutionContext,
        embeddings: Arc<dyn Embeddings>,
        documents: &[Document],
        item_index: usize,
    ) -> Result<()>;

    /// Release a store handle.
    ///
    /// Must be a no-op on an already-released handle. Release failures are
    /// the adapter's to log; this method cannot fail.
    fn release_store(&self, _store: &dyn VectorStore) {}
}
