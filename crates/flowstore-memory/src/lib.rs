// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! In-memory vector store backend for FlowStore.
//!
//! Stores embedded documents in a `HashMap` behind a `RwLock`, scored with
//! cosine similarity. Useful for testing, prototyping, and small datasets
//! that fit in memory; it is also the reference implementation of the
//! [`VectorStoreProvider`] adapter contract.

use async_trait::async_trait;
use flowstore::core::documents::Document;
use flowstore::core::embeddings::Embeddings;
use flowstore::core::error::{Error, Result};
use flowstore::core::vector_stores::{MetadataFilter, VectorStore, VectorStoreProvider};
use flowstore::node::context::ExecutionContext;
use flowstore::node::{NodeMeta, OperationMode};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Internal document representation with embedded vector.
#[derive(Debug, Clone)]
struct StoredDocument {
    text: String,
    vector: Vec<f32>,
    metadata: HashMap<String, serde_json::Value>,
}

type Records = Arc<RwLock<HashMap<String, StoredDocument>>>;

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    // Clamp to [-1, 1] to handle floating point errors
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

fn matches_filter(doc: &StoredDocument, filter: Option<&MetadataFilter>) -> bool {
    match filter {
        None => true,
        Some(filter) => filter
            .iter()
            .all(|(key, value)| doc.metadata.get(key) == Some(value)),
    }
}

/// Store handle over the shared in-memory records.
///
/// Acquired from a [`MemoryVectorStoreProvider`]; a metadata filter bound
/// at acquisition applies to every search unless the caller passes its own
/// per-call filter.
pub struct MemoryVectorStore {
    records: Records,
    embeddings: Arc<dyn Embeddings>,
    bound_filter: Option<MetadataFilter>,
}

impl MemoryVectorStore {
    async fn insert(&self, documents: &[Document], ids: Option<&[String]>) -> Result<Vec<String>> {
        if let Some(ids) = ids {
            if ids.len() != documents.len() {
                return Err(Error::invalid_input(format!(
                    "Got {} ids for {} documents",
                    ids.len(),
                    documents.len()
                )));
            }
        }

        let texts: Vec<String> = documents.iter().map(|d| d.page_content.clone()).collect();
        let vectors = self.embeddings.embed_documents(&texts).await?;

        let mut records = self.records.write();
        let mut assigned = Vec::with_capacity(documents.len());
        for (index, (document, vector)) in documents.iter().zip(vectors).enumerate() {
            let id = match ids {
                Some(ids) => ids[index].clone(),
                None => document
                    .id
                    .clone()
                    .unwrap_or_else(|| Uuid::new_v4().to_string()),
            };
            records.insert(
                id.clone(),
                StoredDocument {
                    text: document.page_content.clone(),
                    vector,
                    metadata: document.metadata.clone(),
                },
            );
            assigned.push(id);
        }
        Ok(assigned)
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn similarity_search_by_vector_with_score(
        &self,
        embedding: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<(Document, f32)>> {
        let filter = filter.or(self.bound_filter.as_ref());
        let records = self.records.read();

        let mut scored: Vec<(Document, f32)> = records
            .iter()
            .filter(|(_, doc)| matches_filter(doc, filter))
            .map(|(id, doc)| {
                let document = Document::new(doc.text.clone())
                    .with_metadata_map(doc.metadata.clone())
                    .with_id(id.clone());
                (document, cosine_similarity(embedding, &doc.vector))
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    async fn add_documents(
        &self,
        documents: &[Document],
        ids: Option<&[String]>,
    ) -> Result<Vec<String>> {
        self.insert(documents, ids).await
    }
}

/// Backend adapter backed by shared in-memory records.
///
/// All handles acquired from one provider see the same records, so a
/// populate followed by an acquire-and-search observes the inserted
/// documents. Handle acquisition and release are counted for diagnostics.
#[derive(Default)]
pub struct MemoryVectorStoreProvider {
    records: Records,
    acquired: AtomicUsize,
    released: AtomicUsize,
    populate_calls: AtomicUsize,
}

impl MemoryVectorStoreProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Number of store handles acquired so far.
    #[must_use]
    pub fn acquired_count(&self) -> usize {
        self.acquired.load(Ordering::Relaxed)
    }

    /// Number of store handle releases so far.
    #[must_use]
    pub fn released_count(&self) -> usize {
        self.released.load(Ordering::Relaxed)
    }

    /// Number of `populate_store` calls so far.
    #[must_use]
    pub fn populate_call_count(&self) -> usize {
        self.populate_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl VectorStoreProvider for MemoryVectorStoreProvider {
    async fn acquire_store(
        &self,
        context: &ExecutionContext,
        filter: Option<&MetadataFilter>,
        embeddings: Arc<dyn Embeddings>,
        item_index: usize,
    ) -> Result<Arc<dyn VectorStore>> {
        self.acquired.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            node = context.node_name(),
            item_index,
            has_filter = filter.is_some(),
            "acquired in-memory store handle"
        );
        Ok(Arc::new(MemoryVectorStore {
            records: Arc::clone(&self.records),
            embeddings,
            bound_filter: filter.cloned(),
        }))
    }

    async fn populate_store(
        &self,
        context: &ExecutionContext,
        embeddings: Arc<dyn Embeddings>,
        documents: &[Document],
        item_index: usize,
    ) -> Result<()> {
        self.populate_calls.fetch_add(1, Ordering::Relaxed);
        let store = MemoryVectorStore {
            records: Arc::clone(&self.records),
            embeddings,
            bound_filter: None,
        };
        let ids = store.insert(documents, None).await?;
        tracing::debug!(
            node = context.node_name(),
            item_index,
            count = ids.len(),
            "populated in-memory store"
        );
        Ok(())
    }

    fn release_store(&self, _store: &dyn VectorStore) {
        self.released.fetch_add(1, Ordering::Relaxed);
    }
}

/// Node metadata for the in-memory backend.
///
/// The backend supports all five operation modes and needs no
/// backend-specific parameter fields.
#[must_use]
pub fn node_meta() -> NodeMeta {
    NodeMeta {
        display_name: "In-Memory Vector Store".to_string(),
        name: "memoryVectorStore".to_string(),
        description: "Work with your data in a vector store held in process memory".to_string(),
        icon: None,
        operation_modes: vec![
            OperationMode::Load,
            OperationMode::Insert,
            OperationMode::Update,
            OperationMode::Retrieve,
            OperationMode::RetrieveAsTool,
        ],
        fields: Vec::new(),
    }
}
