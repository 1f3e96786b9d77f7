//! Mock reranker for testing.

use async_trait::async_trait;
use flowstore::core::documents::Document;
use flowstore::core::error::Result;
use flowstore::core::rerankers::{Reranker, RELEVANCE_SCORE_KEY};

/// Deterministic reranker for testing.
///
/// By default it reverses the input order and stamps descending relevance
/// scores starting at 1.0, so tests can assert that reranker order (not
/// store order) reaches the output. With explicit scores it reorders by
/// score instead.
#[derive(Debug, Clone, Default)]
pub struct MockReranker {
    /// Relevance scores by input position; `None` means reverse-and-stamp
    scores: Option<Vec<f64>>,
}

impl MockReranker {
    /// Creates a reranker that reverses input order.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reranker assigning `scores` positionally to its input,
    /// then sorting by score descending.
    #[must_use]
    pub fn with_scores(scores: Vec<f64>) -> Self {
        Self {
            scores: Some(scores),
        }
    }
}

#[async_trait]
impl Reranker for MockReranker {
    async fn compress_documents(
        &self,
        documents: Vec<Document>,
        _query: &str,
    ) -> Result<Vec<Document>> {
        let mut scored: Vec<(Document, f64)> = match &self.scores {
            Some(scores) => documents
                .into_iter()
                .enumerate()
                .map(|(i, doc)| {
                    let score = scores.get(i).copied().unwrap_or(0.0);
                    (doc, score)
                })
                .collect(),
            None => {
                let n = documents.len();
                documents
                    .into_iter()
                    .rev()
                    .enumerate()
                    .map(|(i, doc)| (doc, 1.0 - i as f64 / n.max(1) as f64))
                    .collect()
            }
        };

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .map(|(doc, score)| doc.with_metadata(RELEVANCE_SCORE_KEY, score))
            .collect())
    }
}
