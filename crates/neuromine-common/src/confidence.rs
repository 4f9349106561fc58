//! Confidence labelling for compound records.
//!
//! A compound's label summarises how much evidence backs it and how much the
//! sources agree on its mechanism of action:
//!
//! | evidence entries | distinct mechanisms | label  |
//! |------------------|---------------------|--------|
//! | > 5              | exactly 1           | High   |
//! | > 2              | at most 2           | Medium |
//! | anything else    |                     | Low    |
//!
//! Records without evidence are never labelled.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidenceLabel {
    High,
    Medium,
    Low,
}

impl ConfidenceLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLabel::High   => "High",
            ConfidenceLabel::Medium => "Medium",
            ConfidenceLabel::Low    => "Low",
        }
    }
}

impl fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfidenceLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high"   => Ok(ConfidenceLabel::High),
            "medium" => Ok(ConfidenceLabel::Medium),
            "low"    => Ok(ConfidenceLabel::Low),
            other    => Err(format!("unknown confidence label: {other}")),
        }
    }
}

/// Count distinct, non-empty mechanism values.
pub fn distinct_mechanisms<'a, I>(mechanisms: I) -> usize
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    mechanisms
        .into_iter()
        .flatten()
        .filter(|m| !m.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

/// Label for `evidence_count` entries spanning `mechanisms` distinct mechanisms.
/// Returns `None` when there is no evidence at all.
pub fn label_for(evidence_count: usize, mechanisms: usize) -> Option<ConfidenceLabel> {
    if evidence_count == 0 {
        return None;
    }
    let label = if evidence_count > 5 && mechanisms == 1 {
        ConfidenceLabel::High
    } else if evidence_count > 2 && mechanisms <= 2 {
        ConfidenceLabel::Medium
    } else {
        ConfidenceLabel::Low
    };
    Some(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_entries_single_mechanism_is_high() {
        assert_eq!(label_for(6, 1), Some(ConfidenceLabel::High));
    }

    #[test]
    fn test_six_entries_without_mechanism_falls_to_medium() {
        // m == 0 fails the High rule but satisfies m <= 2
        assert_eq!(label_for(6, 0), Some(ConfidenceLabel::Medium));
    }

    #[test]
    fn test_three_entries_two_mechanisms_is_medium() {
        assert_eq!(label_for(3, 2), Some(ConfidenceLabel::Medium));
    }

    #[test]
    fn test_many_mechanisms_is_low() {
        assert_eq!(label_for(10, 3), Some(ConfidenceLabel::Low));
    }

    #[test]
    fn test_single_entry_is_low() {
        assert_eq!(label_for(1, 1), Some(ConfidenceLabel::Low));
    }

    #[test]
    fn test_no_evidence_is_unlabelled() {
        assert_eq!(label_for(0, 0), None);
    }

    #[test]
    fn test_distinct_mechanisms_ignores_blank_and_missing() {
        let mechs = vec![Some("TrkB agonist"), Some(""), None, Some("TrkB agonist"), Some("ROS scavenger")];
        assert_eq!(distinct_mechanisms(mechs), 2);
    }

    #[test]
    fn test_label_round_trips_through_str() {
        assert_eq!("medium".parse::<ConfidenceLabel>(), Ok(ConfidenceLabel::Medium));
        assert_eq!(ConfidenceLabel::High.to_string(), "High");
        assert!("certain".parse::<ConfidenceLabel>().is_err());
    }
}
