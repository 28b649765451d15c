//! Immutable corpus snapshot.
//!
//! The ingestion pipeline exports contractors as JSON, either a bare array of
//! records or an object with a `contractors` array. A [`Corpus`] is loaded
//! once, validated, and then shared read-only by every backend.
//!
//! Validation rejects data that would make search results ambiguous:
//! duplicate ids, empty embeddings, embeddings with non-finite components,
//! and embeddings whose dimension disagrees with the rest of the corpus.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::ranking::CorpusStats;
use crate::record::ContractorRecord;
use crate::traits::CorpusStatsProvider;
use crate::{Error, Result};

/// A validated, read-only set of contractor records.
///
/// Cloning is cheap (Arc clone).
#[derive(Debug, Clone)]
pub struct Corpus {
    records: Arc<Vec<ContractorRecord>>,
    dimension: Option<usize>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusDocument {
    Records(Vec<ContractorRecord>),
    Wrapped { contractors: Vec<ContractorRecord> },
}

impl Corpus {
    /// Build a corpus, inferring the embedding dimension from the records.
    pub fn new(records: Vec<ContractorRecord>) -> Result<Self> {
        Self::with_dimension(records, None)
    }

    /// Build a corpus, requiring every embedding to have `expected` components
    /// when given.
    pub fn with_dimension(records: Vec<ContractorRecord>, expected: Option<usize>) -> Result<Self> {
        if expected == Some(0) {
            return Err(Error::config("embedding dimension must be positive"));
        }

        let mut seen = HashSet::with_capacity(records.len());
        let mut dimension = expected;

        for record in &records {
            if !seen.insert(record.id) {
                return Err(Error::invalid_data(format!(
                    "duplicate record id {}",
                    record.id
                )));
            }

            let Some(embedding) = record.embedding.as_deref() else {
                continue;
            };

            if embedding.is_empty() {
                return Err(Error::invalid_data(format!(
                    "record {} has an empty embedding",
                    record.id
                )));
            }
            if embedding.iter().any(|v| !v.is_finite()) {
                return Err(Error::invalid_data(format!(
                    "record {} has a non-finite embedding component",
                    record.id
                )));
            }

            match dimension {
                Some(d) if d != embedding.len() => {
                    return Err(Error::invalid_data(format!(
                        "record {} has embedding dimension {}, expected {}",
                        record.id,
                        embedding.len(),
                        d
                    )));
                }
                Some(_) => {}
                None => dimension = Some(embedding.len()),
            }
        }

        log::debug!(
            "corpus validated: {} records, embedding dimension {:?}",
            records.len(),
            dimension
        );

        Ok(Self {
            records: Arc::new(records),
            dimension,
        })
    }

    /// Parse a corpus from a JSON string.
    pub fn from_json_str(json: &str, expected: Option<usize>) -> Result<Self> {
        let records = match serde_json::from_str::<CorpusDocument>(json)? {
            CorpusDocument::Records(records) => records,
            CorpusDocument::Wrapped { contractors } => contractors,
        };
        Self::with_dimension(records, expected)
    }

    /// Load a corpus from a JSON file.
    pub fn load(path: impl AsRef<Path>, expected: Option<usize>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let corpus = Self::from_json_str(&json, expected)?;
        log::info!(
            "loaded {} contractors from {}",
            corpus.len(),
            path.display()
        );
        Ok(corpus)
    }

    /// All records, including inactive ones.
    pub fn records(&self) -> &[ContractorRecord] {
        &self.records
    }

    /// Records eligible for search.
    pub fn active(&self) -> impl Iterator<Item = &ContractorRecord> {
        self.records.iter().filter(|r| r.is_active())
    }

    /// Look up a record by id.
    pub fn get(&self, id: i64) -> Option<&ContractorRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Embedding dimension shared by all embedded records.
    pub fn embedding_dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Counts over active records.
    pub fn stats(&self) -> CorpusStats {
        self.active().fold(CorpusStats::default(), |mut stats, record| {
            stats.total_contractors += 1;
            if record.has_searchable_text() {
                stats.has_fts += 1;
            }
            if record.embedding.is_some() {
                stats.has_embedding += 1;
            }
            stats
        })
    }
}

#[async_trait]
impl CorpusStatsProvider for Corpus {
    async fn stats(&self) -> Result<CorpusStats> {
        Ok(Corpus::stats(self))
    }
}

// ============================================================================
// Tests
// ============================================================================
