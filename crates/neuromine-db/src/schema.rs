//! Record types stored in the compound collection.

use chrono::{DateTime, Utc};
use neuromine_common::confidence::{distinct_mechanisms, label_for};
use neuromine_common::ConfidenceLabel;
use serde::{Deserialize, Serialize};

pub const TABLE_COMPOUNDS: &str = "compounds";

/// One block of extracted information tied to a source article.
/// Immutable once appended to a [`CompoundRecord`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceEntry {
    /// Tabular row identifier of the source article (e.g. `PMC1234.xml`).
    pub file_name: String,
    pub title: String,
    pub text_block: String,
    pub structure: Option<String>,
    pub identifier: Option<String>,
    pub evidence_description: Option<String>,
    pub evidence_type: Option<String>,
    pub disease_targeted: Option<String>,
    pub mechanism_of_action: Option<String>,
    pub references: Option<String>,
    /// Confidence reported by the model for this block, verbatim.
    pub confidence_score: Option<String>,
    pub manual_validation: Option<String>,
}

/// Aggregated evidence for one compound, keyed by `compound_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundRecord {
    pub compound_name: String,
    pub evidence: Vec<EvidenceEntry>,
    pub confidence_label: Option<ConfidenceLabel>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CompoundRecord {
    pub fn new(compound_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            compound_name: compound_name.into(),
            evidence: Vec::new(),
            confidence_label: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Number of distinct non-empty mechanisms across all evidence.
    pub fn mechanism_count(&self) -> usize {
        distinct_mechanisms(self.evidence.iter().map(|e| e.mechanism_of_action.as_deref()))
    }

    /// Confidence label implied by the current evidence; `None` without evidence.
    pub fn score(&self) -> Option<ConfidenceLabel> {
        label_for(self.evidence.len(), self.mechanism_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(mechanism: Option<&str>) -> EvidenceEntry {
        EvidenceEntry {
            file_name: "PMC1.xml".to_string(),
            title: "T".to_string(),
            text_block: "block".to_string(),
            mechanism_of_action: mechanism.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_score_uses_evidence_and_mechanisms() {
        let mut rec = CompoundRecord::new("7,8-DHF");
        assert_eq!(rec.score(), None);

        rec.evidence = (0..6).map(|_| entry(Some("TrkB agonist"))).collect();
        assert_eq!(rec.score(), Some(ConfidenceLabel::High));

        rec.evidence = vec![entry(Some("a")), entry(Some("b")), entry(None)];
        assert_eq!(rec.mechanism_count(), 2);
        assert_eq!(rec.score(), Some(ConfidenceLabel::Medium));
    }
}
