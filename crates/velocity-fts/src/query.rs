//! Web-search style query parsing and Tantivy query building.
//!
//! Accepted syntax mirrors what users type into a search box:
//!
//! | Input | Meaning |
//! |-------|---------|
//! | `welder detroit` | both terms required |
//! | `"precision casting"` | adjacent phrase |
//! | `-inactive` | exclude documents containing the term |
//! | `welder or machinist` | either term |
//!
//! Parsing never fails: unbalanced quotes run to the end of the input and
//! stray operators are treated as plain text. Terms that analyse to nothing
//! (stop-words, punctuation) are dropped, so a query made only of those
//! matches nothing.

use tantivy::query::{
    BooleanQuery, BoostQuery, ConstScoreQuery, Occur, PhraseQuery, Query, TermQuery,
};
use tantivy::schema::{Field, IndexRecordOption};
use tantivy::Term;

use velocity_core::RecordStatus;

use crate::schema::{analyze_positions, ContractorSchema};
use crate::types::FtsConfig;

// ============================================================================
// Parsed query
// ============================================================================

/// A single word or quoted phrase, as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTerm {
    Word(String),
    Phrase(String),
}

impl QueryTerm {
    fn text(&self) -> &str {
        match self {
            Self::Word(s) | Self::Phrase(s) => s,
        }
    }
}

/// Conjunction of disjunctions, plus exclusions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Every group must match; a group matches if any of its terms does.
    pub groups: Vec<Vec<QueryTerm>>,
    /// Documents matching any of these are removed.
    pub excluded: Vec<QueryTerm>,
}

/// Parse web-search syntax into a [`ParsedQuery`].
pub fn parse_websearch(input: &str) -> ParsedQuery {
    let mut parsed = ParsedQuery::default();
    let mut pending_or = false;
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut negated = false;
        if c == '-' {
            chars.next();
            match chars.peek() {
                Some(&next) if !next.is_whitespace() => negated = true,
                _ => continue,
            }
        }

        let term = if chars.peek() == Some(&'"') {
            chars.next();
            let mut phrase = String::new();
            for ch in chars.by_ref() {
                if ch == '"' {
                    break;
                }
                phrase.push(ch);
            }
            QueryTerm::Phrase(phrase)
        } else {
            let mut word = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() || ch == '"' {
                    break;
                }
                word.push(ch);
                chars.next();
            }
            if !negated && word.eq_ignore_ascii_case("or") {
                pending_or = !parsed.groups.is_empty();
                continue;
            }
            QueryTerm::Word(word)
        };

        if term.text().trim().is_empty() {
            continue;
        }

        if negated {
            parsed.excluded.push(term);
            pending_or = false;
        } else if pending_or {
            if let Some(group) = parsed.groups.last_mut() {
                group.push(term);
            }
            pending_or = false;
        } else {
            parsed.groups.push(vec![term]);
        }
    }

    parsed
}

// ============================================================================
// Query builder
// ============================================================================

/// Builds Tantivy queries over the contractor schema.
pub struct QueryBuilder<'a> {
    schema: &'a ContractorSchema,
    fields: Vec<(Field, f32)>,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(schema: &'a ContractorSchema, config: &FtsConfig) -> Self {
        Self {
            schema,
            fields: schema.full_text_fields(config),
        }
    }

    /// Build a query restricted to active records.
    ///
    /// Returns `None` when nothing positive survives analysis; such a query
    /// matches no documents.
    pub fn build(&self, input: &str) -> Option<Box<dyn Query>> {
        let parsed = parse_websearch(input);
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        for group in &parsed.groups {
            let mut alternatives: Vec<Box<dyn Query>> =
                group.iter().filter_map(|t| self.term_query(t)).collect();
            match alternatives.len() {
                0 => continue,
                1 => clauses.push((Occur::Must, alternatives.remove(0))),
                _ => {
                    let should = alternatives
                        .into_iter()
                        .map(|q| (Occur::Should, q))
                        .collect::<Vec<_>>();
                    clauses.push((Occur::Must, Box::new(BooleanQuery::new(should))));
                }
            }
        }

        if clauses.is_empty() {
            return None;
        }

        for term in &parsed.excluded {
            if let Some(query) = self.term_query(term) {
                clauses.push((Occur::MustNot, query));
            }
        }

        clauses.push((Occur::Must, self.active_filter()));
        Some(Box::new(BooleanQuery::new(clauses)))
    }

    /// Query for one term across every boosted field.
    fn term_query(&self, term: &QueryTerm) -> Option<Box<dyn Query>> {
        let tokens = analyze_positions(term.text());
        if tokens.is_empty() {
            return None;
        }

        let per_field = self
            .fields
            .iter()
            .map(|&(field, boost)| {
                let query = field_query(field, &tokens);
                let boosted: Box<dyn Query> = if (boost - 1.0).abs() > f32::EPSILON {
                    Box::new(BoostQuery::new(query, boost))
                } else {
                    query
                };
                (Occur::Should, boosted)
            })
            .collect::<Vec<_>>();

        Some(Box::new(BooleanQuery::new(per_field)))
    }

    /// Non-scoring filter on `status = Active`.
    fn active_filter(&self) -> Box<dyn Query> {
        let term = Term::from_field_text(self.schema.status, RecordStatus::Active.as_str());
        let query = TermQuery::new(term, IndexRecordOption::Basic);
        Box::new(ConstScoreQuery::new(Box::new(query), 0.0))
    }
}

/// Single token: term query. Several: phrase query keeping the gaps left
/// by removed stop-words, offsets relative to the first token.
fn field_query(field: Field, tokens: &[(usize, String)]) -> Box<dyn Query> {
    match tokens {
        [(_, token)] => {
            let term = Term::from_field_text(field, token);
            Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs))
        }
        _ => {
            let base = tokens.first().map_or(0, |(position, _)| *position);
            let terms = tokens
                .iter()
                .map(|(position, token)| (position - base, Term::from_field_text(field, token)))
                .collect::<Vec<_>>();
            Box::new(PhraseQuery::new_with_offset(terms))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
