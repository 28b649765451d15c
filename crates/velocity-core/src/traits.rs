//! Capability traits implemented by search backends.
//!
//! The search engine only talks to these traits, so the fusion logic does not
//! depend on any concrete storage. Implementations live in `velocity-fts`
//! (keyword) and `velocity-vector` (vector); tests substitute their own.
//!
//! All traits require `Send + Sync` so a single backend instance can be
//! shared across request handlers behind an `Arc`.

use async_trait::async_trait;

use crate::ranking::{CorpusStats, SearchHit};
use crate::Result;

/// Full-text keyword search over active records.
#[async_trait]
pub trait KeywordBackend: Send + Sync {
    /// Rank active records against `query`, returning at most `limit` hits.
    ///
    /// `query` is non-empty; callers validate it. Returns an empty list when
    /// nothing matches and an error when the backend fails. The two must
    /// never be conflated.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;

    /// The backend name for diagnostics.
    fn name(&self) -> &str;
}

/// Nearest-neighbour similarity search over active, embedded records.
#[async_trait]
pub trait VectorBackend: Send + Sync {
    /// Rank active embedded records by cosine similarity to `embedding`,
    /// returning at most `limit` hits.
    async fn search(&self, embedding: &[f32], limit: usize) -> Result<Vec<SearchHit>>;

    /// Dimension every query embedding must have, if known.
    ///
    /// `None` means the backend holds no embeddings yet.
    fn dimension(&self) -> Option<usize>;

    /// The backend name for diagnostics.
    fn name(&self) -> &str;
}

/// Read-only counts used by the status endpoint.
#[async_trait]
pub trait CorpusStatsProvider: Send + Sync {
    async fn stats(&self) -> Result<CorpusStats>;
}
