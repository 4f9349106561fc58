use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use neuromine_common::ConfidenceLabel;
use neuromine_db::{CompoundRecord, CompoundStore, DbError, EvidenceEntry, UpsertOutcome};

/// In-memory [`CompoundStore`] keyed (and therefore ordered) by name.
#[derive(Default)]
pub struct MemoryCompoundStore {
    records: Mutex<BTreeMap<String, CompoundRecord>>,
}

impl MemoryCompoundStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing upsert.
    pub fn insert(&self, record: CompoundRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.compound_name.clone(), record);
    }
}

#[async_trait]
impl CompoundStore for MemoryCompoundStore {
    async fn find_by_name(&self, name: &str) -> neuromine_db::Result<Option<CompoundRecord>> {
        Ok(self.records.lock().unwrap().get(name).cloned())
    }

    async fn upsert_evidence(
        &self,
        name: &str,
        entry: EvidenceEntry,
    ) -> neuromine_db::Result<UpsertOutcome> {
        let mut records = self.records.lock().unwrap();
        match records.get_mut(name) {
            Some(rec) => {
                rec.evidence.push(entry);
                rec.updated_at = Utc::now();
                Ok(UpsertOutcome::Appended { evidence_count: rec.evidence.len() })
            }
            None => {
                let mut rec = CompoundRecord::new(name);
                rec.evidence.push(entry);
                records.insert(name.to_string(), rec);
                Ok(UpsertOutcome::Created)
            }
        }
    }

    async fn set_confidence_label(
        &self,
        name: &str,
        label: ConfidenceLabel,
    ) -> neuromine_db::Result<()> {
        let mut records = self.records.lock().unwrap();
        let rec = records
            .get_mut(name)
            .ok_or_else(|| DbError::NotFound(format!("compound '{name}'")))?;
        rec.confidence_label = Some(label);
        Ok(())
    }

    async fn list_all(&self) -> neuromine_db::Result<Vec<CompoundRecord>> {
        Ok(self.records.lock().unwrap().values().cloned().collect())
    }

    async fn count(&self) -> neuromine_db::Result<u64> {
        Ok(self.records.lock().unwrap().len() as u64)
    }
}
