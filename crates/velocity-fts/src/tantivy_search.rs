//! Tantivy-based keyword backend.
//!
//! The corpus is indexed once into an in-memory Tantivy index. Every record
//! is indexed with its status, and queries carry a non-scoring
//! `status = Active` filter, so inactive contractors never surface.
//!
//! # Example
//!
//! ```rust,ignore
//! use velocity_fts::{FtsConfig, TantivyKeywordBackend};
//!
//! let backend = TantivyKeywordBackend::build(&corpus, &FtsConfig::default())?;
//! let hits = backend.search("precision casting", 10).await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use tantivy::collector::TopDocs;
use tantivy::schema::Value;
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument};

use velocity_core::{
    rank_by_score, ContractorRecord, ContractorSummary, Corpus, Error, KeywordBackend, Result,
    SearchHit,
};

use crate::query::QueryBuilder;
use crate::schema::ContractorSchema;
use crate::types::FtsConfig;

const BACKEND_NAME: &str = "tantivy";

/// Keyword backend over an in-memory Tantivy index.
pub struct TantivyKeywordBackend {
    reader: IndexReader,
    schema: ContractorSchema,
    config: FtsConfig,
    summaries: HashMap<i64, ContractorSummary>,
}

impl TantivyKeywordBackend {
    /// Index every record of `corpus`.
    pub fn build(corpus: &Corpus, config: &FtsConfig) -> Result<Self> {
        let schema = ContractorSchema::build();
        let index = Index::create_in_ram(schema.schema.clone());
        ContractorSchema::register_tokenizers(&index);

        let mut writer: IndexWriter = index
            .writer_with_num_threads(1, config.writer_memory_bytes)
            .map_err(|e| Error::search(BACKEND_NAME, format!("failed to create writer: {e}")))?;

        let mut summaries = HashMap::with_capacity(corpus.len());
        for record in corpus.records() {
            writer
                .add_document(to_document(&schema, record))
                .map_err(|e| {
                    Error::search(BACKEND_NAME, format!("failed to index {}: {e}", record.id))
                })?;
            summaries.insert(record.id, record.summary());
        }

        writer
            .commit()
            .map_err(|e| Error::search(BACKEND_NAME, format!("commit failed: {e}")))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| Error::search(BACKEND_NAME, format!("failed to open reader: {e}")))?;

        log::info!("indexed {} contractors for keyword search", summaries.len());

        Ok(Self {
            reader,
            schema,
            config: config.clone(),
            summaries,
        })
    }

    /// Number of indexed documents, inactive ones included.
    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }
}

impl std::fmt::Debug for TantivyKeywordBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TantivyKeywordBackend")
            .field("num_docs", &self.num_docs())
            .field("config", &self.config)
            .finish()
    }
}

fn to_document(schema: &ContractorSchema, record: &ContractorRecord) -> TantivyDocument {
    let mut doc = TantivyDocument::default();
    doc.add_i64(schema.id, record.id);
    doc.add_text(schema.status, record.status.as_str());

    let name = record.full_name();
    if !name.is_empty() {
        doc.add_text(schema.name, name);
    }
    let optional = [
        (schema.company, &record.company_name),
        (schema.location, &record.location),
        (schema.job_description, &record.job_description),
    ];
    for (field, value) in optional {
        if let Some(text) = value {
            doc.add_text(field, text);
        }
    }
    doc
}

#[async_trait]
impl KeywordBackend for TantivyKeywordBackend {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let builder = QueryBuilder::new(&self.schema, &self.config);
        let Some(tantivy_query) = builder.build(query) else {
            log::debug!("query {query:?} has no searchable terms");
            return Ok(Vec::new());
        };

        let searcher = self.reader.searcher();
        let candidates = searcher.num_docs().max(1) as usize;
        let top_docs = searcher
            .search(&tantivy_query, &TopDocs::with_limit(candidates))
            .map_err(|e| Error::search(BACKEND_NAME, e.to_string()))?;

        let mut scored = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| Error::search(BACKEND_NAME, e.to_string()))?;
            let id = doc
                .get_first(self.schema.id)
                .and_then(|v| v.as_i64())
                .ok_or_else(|| Error::search(BACKEND_NAME, "indexed document has no id"))?;
            let summary = self.summaries.get(&id).ok_or_else(|| {
                Error::search(BACKEND_NAME, format!("indexed id {id} not in corpus"))
            })?;
            scored.push((summary.clone(), score as f64));
        }

        let hits = rank_by_score(scored, limit);
        log::debug!("keyword query {query:?} returned {} hits", hits.len());
        Ok(hits)
    }

    fn name(&self) -> &str {
        BACKEND_NAME
    }
}

// ============================================================================
// Tests
// ============================================================================
