//! Contractor records: the searchable entities of the corpus.
//!
//! Records are written by collaborators outside this workspace (ingestion and
//! update pipelines). The search engine only reads them, so every type here is
//! plain data.

use serde::{Deserialize, Serialize};

// ============================================================================
// Status
// ============================================================================

/// Lifecycle status of a record. Only [`RecordStatus::Active`] records are
/// eligible for search.
///
/// Serialized as the capitalized word used by the application database
/// (`"Active"`, `"Inactive"`, ...). Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordStatus {
    Active,
    Inactive,
    Pending,
    Terminated,
    Other(String),
}

impl RecordStatus {
    /// The stored string form.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Pending => "Pending",
            Self::Terminated => "Terminated",
            Self::Other(s) => s,
        }
    }

    /// Whether records with this status may appear in search results.
    pub fn is_searchable(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl From<String> for RecordStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Active" => Self::Active,
            "Inactive" => Self::Inactive,
            "Pending" => Self::Pending,
            "Terminated" => Self::Terminated,
            _ => Self::Other(value),
        }
    }
}

impl From<RecordStatus> for String {
    fn from(value: RecordStatus) -> Self {
        value.as_str().to_string()
    }
}

impl Default for RecordStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Records
// ============================================================================

/// A contractor as stored by the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractorRecord {
    /// Database identifier. Unique and immutable.
    pub id: i64,

    /// Business identifier, e.g. `CONT-0001`.
    pub contractor_id: String,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub company_name: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub job_description: Option<String>,

    #[serde(default)]
    pub status: RecordStatus,

    /// Embedding of the record's text, absent until the embedding pipeline
    /// has processed it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl ContractorRecord {
    /// Create an active record with only the identifiers set.
    pub fn new(id: i64, contractor_id: impl Into<String>) -> Self {
        Self {
            id,
            contractor_id: contractor_id.into(),
            first_name: None,
            last_name: None,
            email: None,
            company_name: None,
            location: None,
            job_description: None,
            status: RecordStatus::Active,
            embedding: None,
        }
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company_name = Some(company.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_job_description(mut self, description: impl Into<String>) -> Self {
        self.job_description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Whether the record may appear in search results.
    pub fn is_active(&self) -> bool {
        self.status.is_searchable()
    }

    /// Full name, skipping missing parts.
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether any keyword-indexed field carries text.
    pub fn has_searchable_text(&self) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.company_name,
            &self.location,
            &self.job_description,
        ]
        .into_iter()
        .any(|field| field.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }

    /// The fields echoed back in search results.
    pub fn summary(&self) -> ContractorSummary {
        ContractorSummary {
            id: self.id,
            contractor_id: self.contractor_id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            company_name: self.company_name.clone(),
            location: self.location.clone(),
            job_description: self.job_description.clone(),
        }
    }
}

/// The subset of record fields returned to search callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractorSummary {
    pub id: i64,
    pub contractor_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub job_description: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_known_values() {
        for status in ["Active", "Inactive", "Pending", "Terminated"] {
            let parsed = RecordStatus::from(status.to_string());
            assert!(!matches!(parsed, RecordStatus::Other(_)));
            assert_eq!(parsed.as_str(), status);
        }
    }

    #[test]
    fn test_status_keeps_unknown_values() {
        let parsed: RecordStatus = serde_json::from_str("\"On Hold\"").unwrap();
        assert_eq!(parsed, RecordStatus::Other("On Hold".to_string()));
        assert!(!parsed.is_searchable());
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"On Hold\"");
    }

    #[test]
    fn test_status_is_case_sensitive() {
        let parsed = RecordStatus::from("active".to_string());
        assert!(!parsed.is_searchable());
    }

    #[test]
    fn test_record_deserialization_defaults() {
        let json = r#"{"id": 7, "contractor_id": "CONT-0007"}"#;
        let record: ContractorRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 7);
        assert!(record.is_active());
        assert!(record.embedding.is_none());
        assert!(!record.has_searchable_text());
    }

    #[test]
    fn test_record_null_embedding() {
        let json = r#"{"id": 1, "contractor_id": "C1", "embedding": null, "status": "Inactive"}"#;
        let record: ContractorRecord = serde_json::from_str(json).unwrap();
        assert!(record.embedding.is_none());
        assert!(!record.is_active());
    }

    #[test]
    fn test_full_name_skips_missing_parts() {
        let record = ContractorRecord::new(1, "C1").with_name("John", "");
        assert_eq!(record.full_name(), "John");

        let record = ContractorRecord::new(2, "C2").with_name("Lisa", "Thompson");
        assert_eq!(record.full_name(), "Lisa Thompson");
    }

    #[test]
    fn test_has_searchable_text_ignores_blank_fields() {
        let record = ContractorRecord::new(1, "C1").with_company("   ");
        assert!(!record.has_searchable_text());

        let record = record.with_location("Detroit, MI");
        assert!(record.has_searchable_text());
    }

    #[test]
    fn test_email_is_not_searchable_text() {
        let record = ContractorRecord::new(1, "C1").with_email("a@b.com");
        assert!(!record.has_searchable_text());
    }

    #[test]
    fn test_summary_echoes_fields() {
        let record = ContractorRecord::new(3, "CONT-0003")
            .with_name("Robert", "Kim")
            .with_email("robert.kim@fastlogistics.com")
            .with_company("FastLogistics Express")
            .with_location("Detroit, MI")
            .with_job_description("Logistics coordination")
            .with_embedding(vec![0.1, 0.2]);

        let summary = record.summary();
        assert_eq!(summary.id, 3);
        assert_eq!(summary.contractor_id, "CONT-0003");
        assert_eq!(summary.company_name.as_deref(), Some("FastLogistics Express"));

        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("embedding"));
        assert!(!json.contains("status"));
    }
}
