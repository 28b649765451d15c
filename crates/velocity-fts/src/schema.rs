//! Tantivy schema for contractor records.
//!
//! | Field | Type | Purpose |
//! |-------|------|---------|
//! | `id` | i64, stored | Maps hits back to corpus records |
//! | `status` | raw string | Active-only filter |
//! | `name` | text | First + last name |
//! | `company` | text | Company name |
//! | `location` | text | City / state |
//! | `job_description` | text | Role description |
//!
//! Text fields share one English analyser, used both when indexing and when
//! analysing query terms, so stemmed query tokens line up with the index.

use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, INDEXED, STORED, STRING,
};
use tantivy::tokenizer::{
    Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, StopWordFilter,
    TextAnalyzer, TokenStream,
};
use tantivy::Index;

use crate::types::FtsConfig;

/// Name under which the English analyser is registered on the index.
pub const ANALYZER_NAME: &str = "velocity_en";

/// Handles to every field of the contractor schema.
#[derive(Debug, Clone)]
pub struct ContractorSchema {
    pub schema: Schema,
    pub id: Field,
    pub status: Field,
    pub name: Field,
    pub company: Field,
    pub location: Field,
    pub job_description: Field,
}

impl ContractorSchema {
    /// Build the schema.
    pub fn build() -> Self {
        let text = TextOptions::default().set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(ANALYZER_NAME)
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        );

        let mut builder = Schema::builder();
        let id = builder.add_i64_field("id", INDEXED | STORED);
        let status = builder.add_text_field("status", STRING);
        let name = builder.add_text_field("name", text.clone());
        let company = builder.add_text_field("company", text.clone());
        let location = builder.add_text_field("location", text.clone());
        let job_description = builder.add_text_field("job_description", text);

        Self {
            schema: builder.build(),
            id,
            status,
            name,
            company,
            location,
            job_description,
        }
    }

    /// Register the analyser used by the text fields.
    pub fn register_tokenizers(index: &Index) {
        index.tokenizers().register(ANALYZER_NAME, english_analyzer());
    }

    /// Full-text fields with their boost weights.
    pub fn full_text_fields(&self, config: &FtsConfig) -> Vec<(Field, f32)> {
        vec![
            (self.name, config.name_boost),
            (self.company, config.company_boost),
            (self.job_description, config.job_description_boost),
            (self.location, config.location_boost),
        ]
    }
}

/// Lower-casing, stop-word removing, stemming English analyser.
pub fn english_analyzer() -> TextAnalyzer {
    let stop_words = StopWordFilter::new(Language::English)
        .unwrap_or_else(|| StopWordFilter::remove(Vec::<String>::new()));

    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(40))
        .filter(LowerCaser)
        .filter(stop_words)
        .filter(Stemmer::new(Language::English))
        .build()
}

/// Run `text` through the English analyser.
///
/// Returns stemmed, lower-cased tokens with stop-words removed
/// (e.g. "the Welders" → `["welder"]`).
pub fn analyze(text: &str) -> Vec<String> {
    analyze_positions(text)
        .into_iter()
        .map(|(_, token)| token)
        .collect()
}

/// Like [`analyze`], but keeps each token's position in the source text.
///
/// Removed stop-words leave gaps: "inspector for aluminum" yields
/// positions 0 and 2.
pub fn analyze_positions(text: &str) -> Vec<(usize, String)> {
    let mut analyzer = english_analyzer();
    let mut stream = analyzer.token_stream(text);
    let mut tokens = Vec::new();
    while let Some(token) = stream.next() {
        tokens.push((token.position, token.text.clone()));
    }
    tokens
}
