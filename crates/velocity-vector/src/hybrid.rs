//! Hybrid search combining keyword and vector results.
//!
//! Implements weighted Reciprocal Rank Fusion (RRF) for merging the two
//! ranked candidate pools.
//!
//! # Algorithm
//!
//! Fused score for document `d`:
//!
//! `rrf(d) = wk / (k + rank_k(d)) + wv / (k + rank_v(d))`
//!
//! where `rank_k` / `rank_v` are the 1-based ranks reported by the keyword
//! and vector backends. A document missing from one list gets no
//! contribution from it. With non-negative weights and `k >= 0` every fused
//! score is non-negative.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use velocity_core::ranking::compare_scores;
use velocity_core::{ContractorSummary, Error, Result, SearchHit};

/// Fusion constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RrfConfig {
    /// Rank smoothing constant.
    #[serde(default = "default_k")]
    pub k: f64,

    /// Weight of the keyword term.
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f64,

    /// Weight of the vector term.
    #[serde(default = "default_vector_weight")]
    pub vector_weight: f64,
}

fn default_k() -> f64 {
    60.0
}

fn default_keyword_weight() -> f64 {
    0.4
}

fn default_vector_weight() -> f64 {
    0.6
}

impl Default for RrfConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            keyword_weight: default_keyword_weight(),
            vector_weight: default_vector_weight(),
        }
    }
}

impl RrfConfig {
    /// Check that fused scores will be finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        if !self.k.is_finite() || self.k < 0.0 {
            return Err(Error::config(format!(
                "rrf.k must be a non-negative number, got {}",
                self.k
            )));
        }
        for (name, weight) in [
            ("keyword_weight", self.keyword_weight),
            ("vector_weight", self.vector_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::config(format!(
                    "rrf.{name} must be a non-negative number, got {weight}"
                )));
            }
        }
        Ok(())
    }

    /// Contribution of a single list position.
    pub fn term(&self, weight: f64, rank: usize) -> f64 {
        weight / (self.k + rank as f64)
    }
}

/// A fused result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedHit {
    #[serde(flatten)]
    pub record: ContractorSummary,

    /// Combined score (higher is better).
    pub rrf_score: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_rank: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_rank: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_score: Option<f64>,
}

impl FusedHit {
    pub fn id(&self) -> i64 {
        self.record.id
    }

    fn from_summary(record: ContractorSummary) -> Self {
        Self {
            record,
            rrf_score: 0.0,
            keyword_rank: None,
            vector_rank: None,
            keyword_score: None,
            vector_score: None,
        }
    }
}

/// Merge keyword and vector results using weighted Reciprocal Rank Fusion.
///
/// Every document of either list appears in the output (before truncation
/// to `limit`), ordered by fused score descending, then id ascending. If a
/// list reports the same id more than once, its first occurrence wins.
pub fn reciprocal_rank_fusion(
    keyword: &[SearchHit],
    vector: &[SearchHit],
    config: &RrfConfig,
    limit: usize,
) -> Vec<FusedHit> {
    let mut fused: BTreeMap<i64, FusedHit> = BTreeMap::new();

    for hit in keyword {
        let entry = fused
            .entry(hit.id())
            .or_insert_with(|| FusedHit::from_summary(hit.record.clone()));
        if entry.keyword_rank.is_none() {
            entry.keyword_rank = Some(hit.rank);
            entry.keyword_score = Some(hit.score);
            entry.rrf_score += config.term(config.keyword_weight, hit.rank);
        }
    }

    for hit in vector {
        let entry = fused
            .entry(hit.id())
            .or_insert_with(|| FusedHit::from_summary(hit.record.clone()));
        if entry.vector_rank.is_none() {
            entry.vector_rank = Some(hit.rank);
            entry.vector_score = Some(hit.score);
            entry.rrf_score += config.term(config.vector_weight, hit.rank);
        }
    }

    // BTreeMap yields ascending ids; the stable sort keeps that order on ties.
    let mut results: Vec<FusedHit> = fused.into_values().collect();
    results.sort_by(|a, b| compare_scores(a.rrf_score, b.rrf_score));
    results.truncate(limit);
    results
}

// ============================================================================
// Tests
// ============================================================================
