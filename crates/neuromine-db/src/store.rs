//! Storage seam for the compound collection.
//!
//! The classifier and scorer only see this trait; LanceDB backs it in
//! production and `neuromine-test-utils` provides an in-memory version.

use async_trait::async_trait;
use neuromine_common::ConfidenceLabel;

use crate::error::Result;
use crate::schema::{CompoundRecord, EvidenceEntry};

/// What an upsert did to the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new record was created holding this single entry.
    Created,
    /// The entry was appended; the record now holds `evidence_count` entries.
    Appended { evidence_count: usize },
}

#[async_trait]
pub trait CompoundStore: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Option<CompoundRecord>>;

    /// Create the record for `name` or append `entry` to its evidence.
    async fn upsert_evidence(&self, name: &str, entry: EvidenceEntry) -> Result<UpsertOutcome>;

    /// Overwrite only the confidence label of an existing record.
    async fn set_confidence_label(&self, name: &str, label: ConfidenceLabel) -> Result<()>;

    /// Every record, ordered by compound name.
    async fn list_all(&self) -> Result<Vec<CompoundRecord>>;

    async fn count(&self) -> Result<u64>;
}
