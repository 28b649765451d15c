//! Velocity Core: shared types, traits, errors, and the corpus snapshot.
//!
//! This crate provides the foundational types used across all Velocity
//! crates. It has no internal Velocity dependencies.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`record`]: Contractor records and their echoed summary
//! - [`ranking`]: Ranked hits, search methods, corpus statistics
//! - [`corpus`]: Validated, read-only corpus snapshot
//! - [`traits`]: Backend capability traits

pub mod corpus;
pub mod error;
pub mod ranking;
pub mod record;
pub mod traits;

// Re-export key types at crate root for convenience
pub use corpus::Corpus;
pub use error::{Error, Result};
pub use ranking::{rank_by_score, CorpusStats, SearchHit, SearchMethod};
pub use record::{ContractorRecord, ContractorSummary, RecordStatus};
pub use traits::{CorpusStatsProvider, KeywordBackend, VectorBackend};
