//! Arrow schema and conversion utilities for LanceDB.
//!
//! Evidence is stored as a JSON array in a Utf8 column; LanceDB has no
//! document type and the entries are only ever read back whole.

use crate::error::{DbError, Result};
use crate::schema::{CompoundRecord, EvidenceEntry, TABLE_COMPOUNDS};
use arrow_array::{Array, Int64Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub fn compound_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("compound_name", DataType::Utf8, false),
        Field::new("evidence", DataType::Utf8, false),
        Field::new("evidence_count", DataType::Int64, false),
        Field::new("confidence_label", DataType::Utf8, true),
        Field::new("created_at", DataType::Utf8, false),
        Field::new("updated_at", DataType::Utf8, false),
    ]))
}

pub fn compound_to_record(compound: &CompoundRecord) -> Result<RecordBatch> {
    let evidence_json = serde_json::to_string(&compound.evidence)?;

    let compound_name = StringArray::from(vec![compound.compound_name.as_str()]);
    let evidence = StringArray::from(vec![evidence_json.as_str()]);
    let evidence_count = Int64Array::from(vec![compound.evidence.len() as i64]);
    let confidence_label = StringArray::from(vec![compound.confidence_label.map(|l| l.as_str())]);
    let created_at = StringArray::from(vec![compound.created_at.to_rfc3339()]);
    let updated_at = StringArray::from(vec![compound.updated_at.to_rfc3339()]);

    RecordBatch::try_new(
        compound_schema(),
        vec![
            Arc::new(compound_name) as Arc<dyn Array>,
            Arc::new(evidence),
            Arc::new(evidence_count),
            Arc::new(confidence_label),
            Arc::new(created_at),
            Arc::new(updated_at),
        ],
    )
    .map_err(|e| DbError::Arrow(e.to_string()))
}

fn corrupt(reason: impl Into<String>) -> DbError {
    DbError::CorruptRow { table: TABLE_COMPOUNDS, reason: reason.into() }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .ok_or_else(|| corrupt(format!("missing column {name}")))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| corrupt(format!("column {name} is not Utf8")))
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

pub fn record_to_compound(batch: &RecordBatch, row: usize) -> Result<CompoundRecord> {
    let names = string_column(batch, "compound_name")?;
    let evidence = string_column(batch, "evidence")?;
    let labels = string_column(batch, "confidence_label")?;
    let created = string_column(batch, "created_at")?;
    let updated = string_column(batch, "updated_at")?;

    let evidence: Vec<EvidenceEntry> = serde_json::from_str(evidence.value(row))?;

    let confidence_label = if labels.is_null(row) {
        None
    } else {
        Some(labels.value(row).parse().map_err(corrupt)?)
    };

    Ok(CompoundRecord {
        compound_name: names.value(row).to_string(),
        evidence,
        confidence_label,
        created_at: parse_timestamp(created.value(row)),
        updated_at: parse_timestamp(updated.value(row)),
    })
}

/// Convert every row of a batch.
pub fn batch_to_compounds(batch: &RecordBatch) -> Result<Vec<CompoundRecord>> {
    (0..batch.num_rows()).map(|row| record_to_compound(batch, row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuromine_common::ConfidenceLabel;

    #[test]
    fn test_compound_survives_arrow_conversion() {
        let mut rec = CompoundRecord::new("Edaravone");
        rec.confidence_label = Some(ConfidenceLabel::Low);
        rec.evidence.push(EvidenceEntry {
            file_name: "PMC42.xml".to_string(),
            title: "Free radical scavenging, in vivo".to_string(),
            text_block: "Edaravone is a neuroprotective compound.".to_string(),
            mechanism_of_action: Some("ROS scavenging".to_string()),
            ..Default::default()
        });

        let batch = compound_to_record(&rec).unwrap();
        assert_eq!(batch.num_rows(), 1);
        let back = record_to_compound(&batch, 0).unwrap();
        assert_eq!(back.compound_name, "Edaravone");
        assert_eq!(back.evidence, rec.evidence);
        assert_eq!(back.confidence_label, Some(ConfidenceLabel::Low));
    }

    #[test]
    fn test_unlabelled_compound_stores_null_label() {
        let batch = compound_to_record(&CompoundRecord::new("Riluzole")).unwrap();
        let labels = string_column(&batch, "confidence_label").unwrap();
        assert!(labels.is_null(0));
    }
}
