//! Ranked result types shared by every search method.
//!
//! A ranking is a list of [`SearchHit`]s ordered by score descending, ties
//! broken by ascending record id, with 1-based ranks assigned after that
//! ordering. [`rank_by_score`] is the single place that ordering is applied.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::record::ContractorSummary;

/// One record in a single-method ranking (keyword or vector).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Echoed record fields.
    #[serde(flatten)]
    pub record: ContractorSummary,

    /// 1-based position within this method's ranking.
    pub rank: usize,

    /// Raw method score: text relevance or cosine similarity.
    pub score: f64,
}

impl SearchHit {
    /// The record id.
    pub fn id(&self) -> i64 {
        self.record.id
    }
}

/// Which search method produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    /// Keyword and vector rankings merged with RRF.
    HybridRrf,
    /// Keyword ranking only; no embedding was supplied.
    KeywordOnly,
    /// Vector ranking only.
    Semantic,
}

impl SearchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HybridRrf => "hybrid_rrf",
            Self::KeywordOnly => "keyword_only",
            Self::Semantic => "semantic",
        }
    }
}

impl std::fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts over the active records of a corpus snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    /// Active records.
    pub total_contractors: usize,
    /// Active records with keyword-indexed text.
    pub has_fts: usize,
    /// Active records with an embedding.
    pub has_embedding: usize,
}

impl CorpusStats {
    /// Semantic (and therefore hybrid) search needs at least one embedding.
    pub fn semantic_available(&self) -> bool {
        self.has_embedding > 0
    }
}

/// Order scored candidates and assign 1-based ranks.
///
/// Sorts by score descending, then id ascending, keeps at most `limit`
/// entries, and numbers them from 1. NaN scores sort last.
pub fn rank_by_score(mut candidates: Vec<(ContractorSummary, f64)>, limit: usize) -> Vec<SearchHit> {
    candidates.sort_by(|(a, sa), (b, sb)| compare_scores(*sa, *sb).then(a.id.cmp(&b.id)));
    candidates.truncate(limit);
    candidates
        .into_iter()
        .enumerate()
        .map(|(i, (record, score))| SearchHit {
            record,
            rank: i + 1,
            score,
        })
        .collect()
}

/// Descending score comparison with NaN treated as the lowest value.
pub fn compare_scores(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ContractorRecord;

    fn summary(id: i64) -> ContractorSummary {
        ContractorRecord::new(id, format!("C{id}")).summary()
    }

    #[test]
    fn test_rank_by_score_orders_descending() {
        let hits = rank_by_score(vec![(summary(1), 0.2), (summary(2), 0.9), (summary(3), 0.5)], 10);
        let ids: Vec<i64> = hits.iter().map(SearchHit::id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        let ranks: Vec<usize> = hits.iter().map(|h| h.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_rank_by_score_breaks_ties_by_id() {
        let hits = rank_by_score(vec![(summary(9), 0.5), (summary(4), 0.5), (summary(6), 0.5)], 10);
        let ids: Vec<i64> = hits.iter().map(SearchHit::id).collect();
        assert_eq!(ids, vec![4, 6, 9]);
    }

    #[test]
    fn test_rank_by_score_truncates_before_ranking() {
        let hits = rank_by_score(vec![(summary(1), 0.1), (summary(2), 0.2), (summary(3), 0.3)], 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id(), 3);
        assert_eq!(hits[1].rank, 2);
    }

    #[test]
    fn test_rank_by_score_nan_sorts_last() {
        let hits = rank_by_score(vec![(summary(1), f64::NAN), (summary(2), 0.0)], 10);
        assert_eq!(hits[0].id(), 2);
        assert_eq!(hits[1].id(), 1);
    }

    #[test]
    fn test_rank_by_score_empty() {
        assert!(rank_by_score(Vec::new(), 5).is_empty());
    }

    #[test]
    fn test_search_hit_serializes_flat() {
        let hit = SearchHit {
            record: summary(5),
            rank: 1,
            score: 0.75,
        };
        let value = serde_json::to_value(&hit).unwrap();
        assert_eq!(value["id"], 5);
        assert_eq!(value["contractor_id"], "C5");
        assert_eq!(value["rank"], 1);
        assert_eq!(value["score"], 0.75);
    }

    #[test]
    fn test_search_method_strings() {
        assert_eq!(SearchMethod::HybridRrf.as_str(), "hybrid_rrf");
        assert_eq!(SearchMethod::KeywordOnly.as_str(), "keyword_only");
        assert_eq!(
            serde_json::to_string(&SearchMethod::Semantic).unwrap(),
            "\"semantic\""
        );
    }

    #[test]
    fn test_semantic_available() {
        let mut stats = CorpusStats {
            total_contractors: 3,
            has_fts: 3,
            has_embedding: 0,
        };
        assert!(!stats.semantic_available());
        stats.has_embedding = 1;
        assert!(stats.semantic_available());
    }
}
