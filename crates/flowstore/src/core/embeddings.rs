//! Embedding capability trait.
//!
//! An embeddings provider maps text to numeric vectors. The node layer
//! treats it as an opaque capability supplied by the hosting platform
//! (connected to the node's embedding input port); concrete providers live
//! outside this crate.

use crate::core::error::Result;
use async_trait::async_trait;

/// Maps text to embedding vectors.
///
/// Implementations are typically network-bound API clients. Both methods
/// must produce vectors of the same dimensionality.
#[async_trait]
pub trait Embeddings: Send + Sync {
    /// Embed a batch of documents.
    ///
    /// Returns one vector per input text, in input order.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query string.
    ///
    /// Some providers use distinct query/document embedding spaces, so this
    /// is a separate method rather than a one-element batch.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;
}
