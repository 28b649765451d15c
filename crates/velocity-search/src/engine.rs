//! The hybrid search engine.
//!
//! [`SearchEngine`] composes one keyword backend, one vector backend and a
//! stats provider. It validates requests, applies limits and the candidate
//! pool, runs backend calls under a timeout, and fuses rankings with RRF.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use velocity_search::{HybridQuery, SearchConfig, SearchEngine};
//!
//! let engine = SearchEngine::new(keyword, vector, stats, SearchConfig::default())?;
//! let outcome = engine
//!     .hybrid(&HybridQuery::new("precision casting").with_embedding(embedding))
//!     .await?;
//! println!("{} results via {}", outcome.len(), outcome.method());
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use velocity_core::{
    CorpusStatsProvider, Error, KeywordBackend, Result, SearchHit, VectorBackend,
};
use velocity_vector::{reciprocal_rank_fusion, validate_query_embedding};

use crate::types::{HybridOutcome, HybridQuery, SearchConfig, SearchStatus, SemanticQuery};

/// Message for a missing or blank query string.
pub const QUERY_REQUIRED: &str = "Query parameter is required";

/// Message for a missing embedding on semantic search.
pub const EMBEDDING_REQUIRED: &str = "Embedding array is required";

/// Stateless search engine over shared, read-only backends.
#[derive(Clone)]
pub struct SearchEngine {
    keyword: Arc<dyn KeywordBackend>,
    vector: Arc<dyn VectorBackend>,
    stats: Arc<dyn CorpusStatsProvider>,
    config: SearchConfig,
}

impl SearchEngine {
    /// Create an engine, validating `config`.
    pub fn new(
        keyword: Arc<dyn KeywordBackend>,
        vector: Arc<dyn VectorBackend>,
        stats: Arc<dyn CorpusStatsProvider>,
        config: SearchConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            keyword,
            vector,
            stats,
            config,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Keyword ranking of up to `min(limit, candidate_pool)` active records.
    pub async fn keyword(&self, query: &str, limit: Option<usize>) -> Result<Vec<SearchHit>> {
        let query = require_query(Some(query))?;
        let limit = self.resolve_limit(limit)?;
        self.keyword_pool(query, limit.min(self.config.candidate_pool))
            .await
    }

    /// Hybrid search.
    ///
    /// With an embedding, both pools are retrieved concurrently and fused;
    /// without one, the keyword ranking is returned as is.
    pub async fn hybrid(&self, request: &HybridQuery) -> Result<HybridOutcome> {
        let query = require_query(request.query.as_deref())?;
        let limit = self.resolve_limit(request.limit)?;

        let Some(embedding) = request.embedding.as_deref() else {
            let hits = self
                .keyword_pool(query, limit.min(self.config.candidate_pool))
                .await?;
            return Ok(HybridOutcome::KeywordOnly(hits));
        };
        validate_query_embedding(embedding, self.vector.dimension())?;

        let started = Instant::now();
        let pool = self.config.candidate_pool;
        let (keyword_hits, vector_hits) = futures::try_join!(
            self.keyword_pool(query, pool),
            self.vector_pool(embedding, pool),
        )?;

        let fused = reciprocal_rank_fusion(&keyword_hits, &vector_hits, &self.config.rrf, limit);
        log::debug!(
            "hybrid query {query:?}: keyword pool {}, vector pool {}, fused {} in {:?}",
            keyword_hits.len(),
            vector_hits.len(),
            fused.len(),
            started.elapsed()
        );
        Ok(HybridOutcome::Fused(fused))
    }

    /// Vector ranking of up to `min(limit, candidate_pool)` active embedded
    /// records.
    pub async fn semantic(&self, request: &SemanticQuery) -> Result<Vec<SearchHit>> {
        let embedding = request
            .embedding
            .as_deref()
            .ok_or_else(|| Error::invalid_input(EMBEDDING_REQUIRED))?;
        let limit = self.resolve_limit(request.limit)?;
        validate_query_embedding(embedding, self.vector.dimension())?;
        self.vector_pool(embedding, limit.min(self.config.candidate_pool))
            .await
    }

    /// Corpus counts and the capabilities they imply.
    pub async fn status(&self) -> Result<SearchStatus> {
        let stats = self.guarded("stats", self.stats.stats()).await?;
        Ok(SearchStatus::new(stats))
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn resolve_limit(&self, limit: Option<usize>) -> Result<usize> {
        match limit {
            None => Ok(self.config.default_limit),
            Some(0) => Err(Error::invalid_input("limit must be at least 1")),
            Some(n) if n > self.config.max_limit => Err(Error::invalid_input(format!(
                "limit must not exceed {}",
                self.config.max_limit
            ))),
            Some(n) => Ok(n),
        }
    }

    async fn keyword_pool(&self, query: &str, size: usize) -> Result<Vec<SearchHit>> {
        self.guarded(self.keyword.name(), self.keyword.search(query, size))
            .await
    }

    async fn vector_pool(&self, embedding: &[f32], size: usize) -> Result<Vec<SearchHit>> {
        self.guarded(self.vector.name(), self.vector.search(embedding, size))
            .await
    }

    /// Run a backend call under the configured timeout.
    async fn guarded<T>(&self, backend: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        let timeout = self.config.query_timeout();
        let started = Instant::now();
        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(value)) => {
                log::debug!("{backend} call finished in {:?}", started.elapsed());
                Ok(value)
            }
            Ok(Err(err)) => {
                log::warn!("{backend} call failed: {err}");
                Err(err)
            }
            Err(_) => {
                log::warn!("{backend} call timed out after {timeout:?}");
                Err(Error::timeout(backend, timeout))
            }
        }
    }
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("keyword", &self.keyword.name())
            .field("vector", &self.vector.name())
            .field("config", &self.config)
            .finish()
    }
}

fn require_query(query: Option<&str>) -> Result<&str> {
    match query.map(str::trim) {
        Some(q) if !q.is_empty() => Ok(q),
        _ => Err(Error::invalid_input(QUERY_REQUIRED)),
    }
}

// ============================================================================
// Tests
// ============================================================================
