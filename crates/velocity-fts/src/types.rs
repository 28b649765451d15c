//! Configuration for the keyword backend.

use serde::{Deserialize, Serialize};

/// Keyword search configuration.
///
/// Boosts weight each indexed field in the BM25 score. Names and company
/// carry the most signal when looking up a contractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FtsConfig {
    /// Boost for first + last name.
    #[serde(default = "default_name_boost")]
    pub name_boost: f32,

    /// Boost for company name.
    #[serde(default = "default_company_boost")]
    pub company_boost: f32,

    /// Boost for the job description.
    #[serde(default = "default_job_description_boost")]
    pub job_description_boost: f32,

    /// Boost for location.
    #[serde(default = "default_location_boost")]
    pub location_boost: f32,

    /// Memory budget for the index writer in bytes (tantivy minimum is 15MB).
    #[serde(default = "default_writer_memory")]
    pub writer_memory_bytes: usize,
}

fn default_name_boost() -> f32 {
    3.0
}

fn default_company_boost() -> f32 {
    2.0
}

fn default_job_description_boost() -> f32 {
    1.5
}

fn default_location_boost() -> f32 {
    1.0
}

fn default_writer_memory() -> usize {
    50_000_000
}

impl Default for FtsConfig {
    fn default() -> Self {
        Self {
            name_boost: default_name_boost(),
            company_boost: default_company_boost(),
            job_description_boost: default_job_description_boost(),
            location_boost: default_location_boost(),
            writer_memory_bytes: default_writer_memory(),
        }
    }
}
