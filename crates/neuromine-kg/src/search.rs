//! Filtering the compound collection.

use neuromine_common::Result;
use neuromine_db::{CompoundRecord, CompoundStore, EvidenceEntry};
use regex::{Regex, RegexBuilder};

pub const DEFAULT_LIMIT: usize = 20;

/// Search criteria; every filter that is set must hold.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Case-insensitive pattern over the name and the evidence text fields.
    pub text: Option<String>,
    pub evidence_type: Option<String>,
    pub disease: Option<String>,
    /// Matches the record label or any evidence confidence score.
    pub confidence: Option<String>,
    pub limit: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self { text: None, evidence_type: None, disease: None, confidence: None, limit: DEFAULT_LIMIT }
    }
}

/// Pattern as a regex, or as a literal when it does not compile.
fn text_matcher(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .or_else(|_| RegexBuilder::new(&regex::escape(pattern)).case_insensitive(true).build())
        .ok()
}

fn evidence_text_matches(re: &Regex, ev: &EvidenceEntry) -> bool {
    re.is_match(&ev.title)
        || re.is_match(&ev.text_block)
        || ev.evidence_description.as_deref().is_some_and(|d| re.is_match(d))
        || ev.disease_targeted.as_deref().is_some_and(|d| re.is_match(d))
}

fn any_field(record: &CompoundRecord, value: &str, field: impl Fn(&EvidenceEntry) -> Option<&str>) -> bool {
    record.evidence.iter().any(|ev| field(ev) == Some(value))
}

pub fn search(records: &[CompoundRecord], query: &SearchQuery) -> Vec<CompoundRecord> {
    let matcher = query.text.as_deref().filter(|t| !t.is_empty()).map(text_matcher);

    let mut hits: Vec<&CompoundRecord> = records
        .iter()
        .filter(|rec| {
            matcher.as_ref().map_or(true, |re| {
                re.as_ref().is_some_and(|re| {
                    re.is_match(&rec.compound_name) || rec.evidence.iter().any(|ev| evidence_text_matches(re, ev))
                })
            })
        })
        .filter(|rec| {
            query
                .evidence_type
                .as_deref()
                .map_or(true, |t| any_field(rec, t, |ev| ev.evidence_type.as_deref()))
        })
        .filter(|rec| {
            query
                .disease
                .as_deref()
                .map_or(true, |d| any_field(rec, d, |ev| ev.disease_targeted.as_deref()))
        })
        .filter(|rec| {
            query.confidence.as_deref().map_or(true, |c| {
                rec.confidence_label.is_some_and(|l| l.as_str() == c)
                    || any_field(rec, c, |ev| ev.confidence_score.as_deref())
            })
        })
        .collect();

    hits.sort_by(|a, b| a.compound_name.cmp(&b.compound_name));
    hits.into_iter().take(query.limit).cloned().collect()
}

/// Load the collection from `store` and search it.
pub async fn search_store(store: &dyn CompoundStore, query: &SearchQuery) -> Result<Vec<CompoundRecord>> {
    let records = store.list_all().await?;
    Ok(search(&records, query))
}
