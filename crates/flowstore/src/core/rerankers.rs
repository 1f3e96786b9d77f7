//! Reranker capability trait.
//!
//! A reranker reorders and rescores a candidate document list given the
//! query. Like embeddings, it is an opaque capability connected by the
//! hosting platform; the handlers only consume its output.

use crate::core::documents::Document;
use crate::core::error::Result;
use async_trait::async_trait;

/// Metadata key under which rerankers report the relevance they assigned.
///
/// The load and retrieve-as-tool handlers strip this key from the returned
/// metadata and surface it as the result score.
pub const RELEVANCE_SCORE_KEY: &str = "relevanceScore";

/// Reorders and rescores candidate documents for a query.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Rerank `documents` against `query`.
    ///
    /// Returns documents in descending relevance order. Each returned
    /// document carries its assigned relevance under
    /// [`RELEVANCE_SCORE_KEY`] in its metadata; the document payload is
    /// otherwise preserved.
    async fn compress_documents(
        &self,
        documents: Vec<Document>,
        query: &str,
    ) -> Result<Vec<Document>>;
}

/// Split a reranked document into its payload and assigned relevance score.
///
/// Removes [`RELEVANCE_SCORE_KEY`] from the metadata so it does not leak
/// into serialized output. A missing or non-numeric score maps to 0.0.
#[must_use]
pub fn take_relevance_score(mut document: Document) -> (Document, f32) {
    let score = document
        .metadata
        .remove(RELEVANCE_SCORE_KEY)
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0) as f32;
    (document, score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_take_relevance_score_strips_key() {
        let doc = Document::new("text")
            .with_metadata(RELEVANCE_SCORE_KEY, 0.87)
            .with_metadata("source", "a.txt");
        let (doc, score) = take_relevance_score(doc);
        assert!((score - 0.87).abs() < 1e-6);
        assert!(!doc.metadata.contains_key(RELEVANCE_SCORE_KEY));
        assert_eq!(doc.metadata.get("source"), Some(&json!("a.txt")));
    }

    #[test]
    fn test_take_relevance_score_missing_defaults_to_zero() {
        let (_, score) = take_relevance_score(Document::new("text"));
        assert_eq!(score, 0.0);
    }
}
