//! Sentence table -> LLM -> compound collection.

use std::path::Path;
use std::sync::Arc;

use neuromine_common::{NeuromineError, Result};
use neuromine_db::{CompoundStore, EvidenceEntry, UpsertOutcome};
use neuromine_ingestion::tabular::{read_rows, TabularRow};
use neuromine_llm::{parse_records, CompoundExtractor, CompoundFragment};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassifySummary {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub blocks_classified: usize,
    pub blocks_without_response: usize,
    pub compounds_upserted: usize,
    pub fragments_discarded: usize,
}

/// Split a sentence blob into text blocks on newlines. When no non-empty
/// line remains the whole blob is a single block.
pub fn split_blocks(blob: &str) -> Vec<&str> {
    let blocks: Vec<&str> = blob.split('\n').map(str::trim).filter(|b| !b.is_empty()).collect();
    if blocks.is_empty() {
        vec![blob]
    } else {
        blocks
    }
}

/// Evidence entry for one fragment found in `block` of `row`.
pub fn to_evidence(row: &TabularRow, block: &str, fragment: CompoundFragment) -> EvidenceEntry {
    EvidenceEntry {
        file_name: row.file.clone(),
        title: row.title.clone(),
        text_block: block.to_string(),
        structure: fragment.structure,
        identifier: fragment.identifier,
        evidence_description: fragment.evidence_description,
        evidence_type: fragment.evidence_type,
        disease_targeted: fragment.disease_targeted,
        mechanism_of_action: fragment.mechanism_of_action,
        references: fragment.references,
        confidence_score: fragment.confidence_score,
        manual_validation: fragment.manual_validation,
    }
}

pub struct Classifier {
    extractor: CompoundExtractor,
    store: Arc<dyn CompoundStore>,
}

impl Classifier {
    pub fn new(extractor: CompoundExtractor, store: Arc<dyn CompoundStore>) -> Self {
        Self { extractor, store }
    }

    /// Create the record for `name` with this entry, or append to it.
    pub async fn upsert_compound(&self, name: &str, evidence: EvidenceEntry) -> Result<UpsertOutcome> {
        let outcome = self.store.upsert_evidence(name, evidence).await?;
        match outcome {
            UpsertOutcome::Created => info!(compound = name, "Inserted new compound"),
            UpsertOutcome::Appended { evidence_count } => {
                info!(compound = name, evidence_count, "Appended evidence to compound")
            }
        }
        Ok(outcome)
    }

    /// Classify every block of every row in the table at `csv_path`.
    pub async fn run(&self, csv_path: &Path) -> Result<ClassifySummary> {
        let rows = read_rows(csv_path)?;
        info!(path = %csv_path.display(), rows = rows.len(), model = self.extractor.model_id(), "Classifying sentence table");

        let mut summary = ClassifySummary { rows_read: rows.len(), ..Default::default() };
        for (idx, row) in rows.iter().enumerate() {
            self.classify_row(idx + 1, row, &mut summary).await;
        }

        info!(?summary, "Classification finished");
        Ok(summary)
    }

    async fn classify_row(&self, row_no: usize, row: &TabularRow, summary: &mut ClassifySummary) {
        if row.file.trim().is_empty() || row.sentences.trim().is_empty() {
            warn!(row = row_no, file = %row.file, "Row without file or sentences, skipping");
            summary.rows_skipped += 1;
            return;
        }

        for (block_idx, block) in split_blocks(&row.sentences).into_iter().enumerate() {
            let block_no = block_idx + 1;
            debug!(row = row_no, block = block_no, file = %row.file, "Classifying block");

            let Some(raw) = self.extractor.classify_block(block).await else {
                summary.blocks_without_response += 1;
                continue;
            };
            summary.blocks_classified += 1;

            for fragment in parse_records(Some(&raw)) {
                let Some(name) = fragment.name().map(str::to_string) else {
                    let err = NeuromineError::MissingField("compound_name".to_string());
                    warn!(row = row_no, block = block_no, file = %row.file, error = %err, "Discarding fragment");
                    summary.fragments_discarded += 1;
                    continue;
                };

                let evidence = to_evidence(row, block, fragment);
                match self.upsert_compound(&name, evidence).await {
                    Ok(_) => summary.compounds_upserted += 1,
                    Err(e) => {
                        warn!(row = row_no, block = block_no, compound = %name, error = %e, "Upsert failed, skipping");
                        summary.fragments_discarded += 1;
                    }
                }
            }
        }
    }
}
