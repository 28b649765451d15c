//! Brute-force cosine similarity backend.
//!
//! Active records with an embedding are copied out of the corpus at build
//! time together with their norms. A query scores every entry, so cost is
//! linear in the number of embedded records.

use async_trait::async_trait;

use velocity_core::{
    rank_by_score, ContractorSummary, Corpus, Error, Result, SearchHit, VectorBackend,
};

use crate::similarity::{cosine_with_norms, norm};

const BACKEND_NAME: &str = "cosine";

struct Entry {
    summary: ContractorSummary,
    embedding: Vec<f32>,
    norm: f64,
}

/// In-memory cosine similarity backend.
pub struct SimpleVectorBackend {
    entries: Vec<Entry>,
    dimension: Option<usize>,
}

impl SimpleVectorBackend {
    /// Collect active, embedded records from `corpus`.
    pub fn build(corpus: &Corpus) -> Self {
        let entries: Vec<Entry> = corpus
            .active()
            .filter_map(|record| {
                let embedding = record.embedding.clone()?;
                Some(Entry {
                    summary: record.summary(),
                    norm: norm(&embedding),
                    embedding,
                })
            })
            .collect();

        let zero_norm = entries.iter().filter(|e| e.norm == 0.0).count();
        if zero_norm > 0 {
            log::warn!("{zero_norm} stored embeddings have zero norm and will score 0.0");
        }
        log::info!("loaded {} embeddings for vector search", entries.len());

        Self {
            entries,
            dimension: corpus.embedding_dimension(),
        }
    }

    /// Number of searchable embeddings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Check a query embedding and return its norm.
///
/// The embedding must be non-empty, match `dimension` when one is known,
/// contain only finite values, and not be the zero vector.
pub fn validate_query_embedding(embedding: &[f32], dimension: Option<usize>) -> Result<f64> {
    if embedding.is_empty() {
        return Err(Error::invalid_input("embedding must not be empty"));
    }
    if let Some(dimension) = dimension
        && embedding.len() != dimension
    {
        return Err(Error::invalid_input(format!(
            "embedding has {} dimensions, expected {dimension}",
            embedding.len()
        )));
    }
    if embedding.iter().any(|v| !v.is_finite()) {
        return Err(Error::invalid_input("embedding contains non-finite values"));
    }
    let query_norm = norm(embedding);
    if query_norm == 0.0 {
        return Err(Error::invalid_input("embedding must not be the zero vector"));
    }
    Ok(query_norm)
}

impl std::fmt::Debug for SimpleVectorBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleVectorBackend")
            .field("entries", &self.entries.len())
            .field("dimension", &self.dimension)
            .finish()
    }
}

#[async_trait]
impl VectorBackend for SimpleVectorBackend {
    async fn search(&self, embedding: &[f32], limit: usize) -> Result<Vec<SearchHit>> {
        let query_norm = validate_query_embedding(embedding, self.dimension)?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let scored = self
            .entries
            .iter()
            .map(|entry| {
                let score = cosine_with_norms(embedding, query_norm, &entry.embedding, entry.norm);
                (entry.summary.clone(), score)
            })
            .collect();

        Ok(rank_by_score(scored, limit))
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    fn name(&self) -> &str {
        BACKEND_NAME
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use velocity_core::{ContractorRecord, RecordStatus};

    fn sample_corpus() -> Corpus {
        Corpus::new(vec![
            ContractorRecord::new(1, "CONT-0001").with_embedding(vec![1.0, 0.0, 0.0]),
            ContractorRecord::new(2, "CONT-0002").with_embedding(vec![0.8, 0.6, 0.0]),
            ContractorRecord::new(3, "CONT-0003").with_embedding(vec![0.0, 1.0, 0.0]),
            ContractorRecord::new(4, "CONT-0004"),
            ContractorRecord::new(5, "CONT-0005")
                .with_status(RecordStatus::Terminated)
                .with_embedding(vec![1.0, 0.0, 0.0]),
        ])
        .unwrap()
    }

    fn ids(hits: &[SearchHit]) -> Vec<i64> {
        hits.iter().map(|h| h.id()).collect()
    }

    #[test]
    fn test_build_skips_inactive_and_unembedded() {
        let backend = SimpleVectorBackend::build(&sample_corpus());
        assert_eq!(backend.len(), 3);
        assert_eq!(backend.dimension(), Some(3));
        assert_eq!(backend.name(), "cosine");
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let backend = SimpleVectorBackend::build(&sample_corpus());
        let hits = backend.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(ids(&hits), vec![1, 2, 3]);
        assert!((hits[0].score - 1.0).abs() < 1e-9);
        assert!((hits[1].score - 0.8).abs() < 1e-6);
        assert!(hits[2].score.abs() < 1e-9);
        assert_eq!(hits.iter().map(|h| h.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_search_limit() {
        let backend = SimpleVectorBackend::build(&sample_corpus());
        let hits = backend.search(&[0.0, 1.0, 0.0], 1).await.unwrap();
        assert_eq!(ids(&hits), vec![3]);
        assert!(backend.search(&[0.0, 1.0, 0.0], 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_ties_by_id() {
        let corpus = Corpus::new(vec![
            ContractorRecord::new(9, "B").with_embedding(vec![1.0, 0.0]),
            ContractorRecord::new(4, "A").with_embedding(vec![2.0, 0.0]),
        ])
        .unwrap();
        let backend = SimpleVectorBackend::build(&corpus);
        let hits = backend.search(&[1.0, 0.0], 10).await.unwrap();
        assert_eq!(ids(&hits), vec![4, 9]);
    }

    #[tokio::test]
    async fn test_zero_norm_record_scores_zero() {
        let corpus = Corpus::new(vec![
            ContractorRecord::new(1, "A").with_embedding(vec![0.0, 0.0]),
            ContractorRecord::new(2, "B").with_embedding(vec![-1.0, 0.0]),
        ])
        .unwrap();
        let backend = SimpleVectorBackend::build(&corpus);
        let hits = backend.search(&[1.0, 0.0], 10).await.unwrap();
        assert_eq!(ids(&hits), vec![1, 2]);
        assert_eq!(hits[0].score, 0.0);
    }

    #[tokio::test]
    async fn test_rejects_empty_embedding() {
        let backend = SimpleVectorBackend::build(&sample_corpus());
        let err = backend.search(&[], 10).await.unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_rejects_wrong_dimension() {
        let backend = SimpleVectorBackend::build(&sample_corpus());
        let err = backend.search(&[1.0, 0.0], 10).await.unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("expected 3"));
    }

    #[tokio::test]
    async fn test_rejects_zero_and_non_finite() {
        let backend = SimpleVectorBackend::build(&sample_corpus());
        assert!(backend.search(&[0.0, 0.0, 0.0], 10).await.unwrap_err().is_client_error());
        assert!(
            backend
                .search(&[f32::INFINITY, 0.0, 0.0], 10)
                .await
                .unwrap_err()
                .is_client_error()
        );
    }

    #[tokio::test]
    async fn test_no_embeddings_returns_empty() {
        let corpus = Corpus::new(vec![ContractorRecord::new(1, "A")]).unwrap();
        let backend = SimpleVectorBackend::build(&corpus);
        assert!(backend.is_empty());
        assert_eq!(backend.dimension(), None);
        assert!(backend.search(&[1.0, 2.0], 10).await.unwrap().is_empty());
    }
}
