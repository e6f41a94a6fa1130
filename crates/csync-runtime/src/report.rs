use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened to one product element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecordOutcome {
    /// New stock code; inserted (or would be, in a dry run).
    Inserted,
    /// Stored product differed in `fields`; updated (or would be).
    Updated { fields: Vec<String> },
    /// Stored product already matched.
    Unchanged,
    /// The element produced no document (no id, uncoercible value).
    Skipped { reason: String },
    /// Stock code already handled earlier in this run.
    Duplicate,
    /// The store rejected the write.
    Failed { error: String },
}

impl RecordOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RecordOutcome::Inserted => "inserted",
            RecordOutcome::Updated { .. } => "updated",
            RecordOutcome::Unchanged => "unchanged",
            RecordOutcome::Skipped { .. } => "skipped",
            RecordOutcome::Duplicate => "duplicate",
            RecordOutcome::Failed { .. } => "failed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordReport {
    /// Zero-based index of the element among the catalog root's children.
    pub position: usize,
    pub stock_code: Option<String>,
    #[serde(flatten)]
    pub outcome: RecordOutcome,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncTotals {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub duplicate: usize,
    pub failed: usize,
}

impl SyncTotals {
    pub fn records(&self) -> usize {
        self.inserted + self.updated + self.unchanged + self.skipped + self.duplicate + self.failed
    }

    /// Store writes issued (or planned, in a dry run).
    pub fn writes(&self) -> usize {
        self.inserted + self.updated
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Distinct stock codes sent to the bulk lookup.
    pub requested: usize,
    /// How many of those were already stored.
    pub existing: usize,
    pub records: Vec<RecordReport>,
}

impl SyncReport {
    pub fn totals(&self) -> SyncTotals {
        let mut t = SyncTotals::default();
        for r in &self.records {
            match r.outcome {
                RecordOutcome::Inserted => t.inserted += 1,
                RecordOutcome::Updated { .. } => t.updated += 1,
                RecordOutcome::Unchanged => t.unchanged += 1,
                RecordOutcome::Skipped { .. } => t.skipped += 1,
                RecordOutcome::Duplicate => t.duplicate += 1,
                RecordOutcome::Failed { .. } => t.failed += 1,
            }
        }
        t
    }

    pub fn outcome_for(&self, stock_code: &str) -> Option<&RecordOutcome> {
        self.records
            .iter()
            .find(|r| r.stock_code.as_deref() == Some(stock_code))
            .map(|r| &r.outcome)
    }

    /// `true` when no record failed to write.
    pub fn is_clean(&self) -> bool {
        self.totals().failed == 0
    }
}
