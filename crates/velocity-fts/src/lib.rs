//! Keyword search for Velocity.
//!
//! Contractors are indexed into an in-memory Tantivy index with an English
//! analyser (lower-casing, stop-words, stemming). Queries use web-search
//! syntax and are ranked by BM25 with per-field boosts.
//!
//! # Modules
//!
//! - [`types`]: Keyword search configuration
//! - [`schema`]: Index schema and analyser
//! - [`query`]: Web-search syntax parsing and query building
//! - [`tantivy_search`]: [`KeywordBackend`](velocity_core::KeywordBackend) implementation

pub mod query;
pub mod schema;
pub mod tantivy_search;
pub mod types;

pub use query::{parse_websearch, ParsedQuery, QueryBuilder, QueryTerm};
pub use schema::{analyze, analyze_positions, ContractorSchema};
pub use tantivy_search::TantivyKeywordBackend;
pub use types::FtsConfig;
