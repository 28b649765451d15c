//! Vector search and rank fusion for Velocity.
//!
//! # Modules
//!
//! - [`similarity`]: Cosine similarity math
//! - [`backend`]: Brute-force [`VectorBackend`](velocity_core::VectorBackend) over the corpus
//! - [`hybrid`]: Weighted Reciprocal Rank Fusion of keyword and vector rankings

pub mod backend;
pub mod hybrid;
pub mod similarity;

pub use backend::{validate_query_embedding, SimpleVectorBackend};
pub use hybrid::{reciprocal_rank_fusion, FusedHit, RrfConfig};
pub use similarity::cosine_similarity;
