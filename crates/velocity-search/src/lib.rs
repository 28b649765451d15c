//! Hybrid search engine for Velocity.
//!
//! Ties a [`KeywordBackend`](velocity_core::KeywordBackend) and a
//! [`VectorBackend`](velocity_core::VectorBackend) together behind the three
//! operations exposed over HTTP: hybrid, semantic, and status.
//!
//! # Modules
//!
//! - [`types`]: Engine configuration, requests, and responses
//! - [`engine`]: [`SearchEngine`] itself

pub mod engine;
pub mod types;

pub use engine::{SearchEngine, EMBEDDING_REQUIRED, QUERY_REQUIRED};
pub use types::{
    Capabilities, HybridOutcome, HybridQuery, SearchConfig, SearchStatus, SemanticQuery,
    STATUS_MESSAGE,
};
