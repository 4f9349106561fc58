//! Confidence labelling over the whole compound collection.

use std::sync::Arc;

use neuromine_common::{ConfidenceLabel, Result};
use neuromine_db::CompoundStore;
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreSummary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Records without evidence, left unlabeled.
    pub skipped: usize,
    pub failed: usize,
}

impl ScoreSummary {
    pub fn labeled(&self) -> usize {
        self.high + self.medium + self.low
    }
}

pub struct Scorer {
    store: Arc<dyn CompoundStore>,
}

impl Scorer {
    pub fn new(store: Arc<dyn CompoundStore>) -> Self {
        Self { store }
    }

    /// Recompute and write the label of every record.
    pub async fn run(&self) -> Result<ScoreSummary> {
        let records = self.store.list_all().await?;
        info!(compounds = records.len(), "Scoring compounds");

        let mut summary = ScoreSummary::default();
        for record in &records {
            let Some(label) = record.score() else {
                debug!(compound = %record.compound_name, "No evidence, leaving unlabeled");
                summary.skipped += 1;
                continue;
            };

            if let Err(e) = self.store.set_confidence_label(&record.compound_name, label).await {
                warn!(compound = %record.compound_name, error = %e, "Failed to write label");
                summary.failed += 1;
                continue;
            }

            debug!(
                compound = %record.compound_name,
                evidence = record.evidence.len(),
                mechanisms = record.mechanism_count(),
                %label,
                "Labeled"
            );
            match label {
                ConfidenceLabel::High => summary.high += 1,
                ConfidenceLabel::Medium => summary.medium += 1,
                ConfidenceLabel::Low => summary.low += 1,
            }
        }

        info!(?summary, "Scoring finished");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_total() {
        let s = ScoreSummary { high: 1, medium: 2, low: 3, skipped: 4, failed: 0 };
        assert_eq!(s.labeled(), 6);
    }
}
