//! Engine configuration, requests, and responses.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use velocity_core::{CorpusStats, Error, Result, SearchHit, SearchMethod};
use velocity_vector::{FusedHit, RrfConfig};

// ============================================================================
// Configuration
// ============================================================================

/// Search engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Limit used when the caller omits one.
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Largest limit a caller may request.
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Candidates retrieved from each backend before fusion.
    #[serde(default = "default_candidate_pool")]
    pub candidate_pool: usize,

    /// Per-backend call timeout in milliseconds.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Fusion constants.
    #[serde(default)]
    pub rrf: RrfConfig,
}

fn default_limit() -> usize {
    20
}

fn default_max_limit() -> usize {
    100
}

fn default_candidate_pool() -> usize {
    50
}

fn default_query_timeout_ms() -> u64 {
    5000
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            candidate_pool: default_candidate_pool(),
            query_timeout_ms: default_query_timeout_ms(),
            rrf: RrfConfig::default(),
        }
    }
}

impl SearchConfig {
    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.default_limit == 0 {
            return Err(Error::config("search.default_limit must be at least 1"));
        }
        if self.max_limit < self.default_limit {
            return Err(Error::config(format!(
                "search.max_limit ({}) is below search.default_limit ({})",
                self.max_limit, self.default_limit
            )));
        }
        if self.candidate_pool == 0 {
            return Err(Error::config("search.candidate_pool must be at least 1"));
        }
        if self.query_timeout_ms == 0 {
            return Err(Error::config("search.query_timeout_ms must be at least 1"));
        }
        self.rrf.validate()
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Hybrid search request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HybridQuery {
    #[serde(default)]
    pub query: Option<String>,

    #[serde(default)]
    pub limit: Option<usize>,

    /// Query embedding; absent means keyword-only.
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

impl HybridQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// Semantic search request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemanticQuery {
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,

    #[serde(default)]
    pub limit: Option<usize>,
}

impl SemanticQuery {
    pub fn new(embedding: Vec<f32>) -> Self {
        Self {
            embedding: Some(embedding),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Result of a hybrid search.
#[derive(Debug, Clone, PartialEq)]
pub enum HybridOutcome {
    /// Both backends ran and were fused.
    Fused(Vec<FusedHit>),
    /// No embedding was supplied; keyword ranking only.
    KeywordOnly(Vec<SearchHit>),
}

impl HybridOutcome {
    pub fn method(&self) -> SearchMethod {
        match self {
            Self::Fused(_) => SearchMethod::HybridRrf,
            Self::KeywordOnly(_) => SearchMethod::KeywordOnly,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Fused(hits) => hits.len(),
            Self::KeywordOnly(hits) => hits.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record ids in result order.
    pub fn ids(&self) -> Vec<i64> {
        match self {
            Self::Fused(hits) => hits.iter().map(FusedHit::id).collect(),
            Self::KeywordOnly(hits) => hits.iter().map(SearchHit::id).collect(),
        }
    }
}

/// Which search methods the current corpus supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub keyword_search: bool,
    pub semantic_search: bool,
    pub hybrid_rrf: bool,
}

impl Capabilities {
    pub fn from_stats(stats: &CorpusStats) -> Self {
        let semantic = stats.semantic_available();
        Self {
            keyword_search: true,
            semantic_search: semantic,
            hybrid_rrf: semantic,
        }
    }
}

/// Status document describing the corpus and capabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStatus {
    pub message: String,
    pub stats: CorpusStats,
    pub capabilities: Capabilities,
}

pub const STATUS_MESSAGE: &str = "Hybrid search system status";

impl SearchStatus {
    pub fn new(stats: CorpusStats) -> Self {
        Self {
            message: STATUS_MESSAGE.to_string(),
            capabilities: Capabilities::from_stats(&stats),
            stats,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
