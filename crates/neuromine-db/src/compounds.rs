//! Compound repository.
//!
//! Upserts are keyed merge-inserts on `compound_name`: the row for a name is
//! read, the new evidence appended, and the whole row written back. This is
//! only safe with a single writer, which is how the pipeline runs.

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::schema::{CompoundRecord, EvidenceEntry, TABLE_COMPOUNDS};
use crate::schema_arrow::{batch_to_compounds, compound_to_record};
use crate::store::{CompoundStore, UpsertOutcome};
use async_trait::async_trait;
use futures::StreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::Table;
use neuromine_common::ConfidenceLabel;
use std::sync::Arc;

/// Repository for compound operations.
#[derive(Clone)]
pub struct CompoundRepository {
    db: Arc<Database>,
}

fn name_filter(name: &str) -> String {
    format!("compound_name = '{}'", name.replace('\'', "''"))
}

impl CompoundRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn table(&self) -> Result<Table> {
        Ok(self.db.connection().open_table(TABLE_COMPOUNDS).execute().await?)
    }

    async fn write(&self, record: &CompoundRecord) -> Result<()> {
        let table = self.table().await?;

        let batch = compound_to_record(record)?;
        let schema = batch.schema();
        let iter = arrow_array::RecordBatchIterator::new(vec![Ok(batch)], schema);

        let mut builder = table.merge_insert(&["compound_name"]);
        builder.when_matched_update_all(None).when_not_matched_insert_all();
        builder.execute(Box::new(iter)).await?;
        Ok(())
    }

    /// Records matching an optional SQL filter.
    async fn query(&self, filter: Option<String>) -> Result<Vec<CompoundRecord>> {
        let table = self.table().await?;
        let query = match filter {
            Some(f) => table.query().only_if(f),
            None => table.query(),
        };
        let mut stream = query.execute().await?;

        let mut compounds = Vec::new();
        while let Some(batch) = stream.next().await {
            compounds.extend(batch_to_compounds(&batch?)?);
        }
        Ok(compounds)
    }
}

#[async_trait]
impl CompoundStore for CompoundRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<CompoundRecord>> {
        Ok(self.query(Some(name_filter(name))).await?.into_iter().next())
    }

    async fn upsert_evidence(&self, name: &str, entry: EvidenceEntry) -> Result<UpsertOutcome> {
        let (mut record, outcome_is_new) = match self.find_by_name(name).await? {
            Some(existing) => (existing, false),
            None => (CompoundRecord::new(name), true),
        };

        record.evidence.push(entry);
        record.updated_at = chrono::Utc::now();
        self.write(&record).await?;

        tracing::debug!(
            compound = name,
            evidence_count = record.evidence.len(),
            "Upserted compound evidence"
        );

        Ok(if outcome_is_new {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Appended { evidence_count: record.evidence.len() }
        })
    }

    async fn set_confidence_label(&self, name: &str, label: ConfidenceLabel) -> Result<()> {
        let table = self.table().await?;
        let filter = name_filter(name);

        if table.count_rows(Some(filter.clone())).await? == 0 {
            return Err(DbError::NotFound(name.to_string()));
        }

        table
            .update()
            .only_if(filter)
            .column("confidence_label", format!("'{}'", label.as_str()))
            .execute()
            .await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<CompoundRecord>> {
        let mut all = self.query(None).await?;
        all.sort_by(|a, b| a.compound_name.cmp(&b.compound_name));
        Ok(all)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.table().await?.count_rows(None).await? as u64)
    }
}
