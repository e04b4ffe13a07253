//! Accounting-package sync log figures

use serde::{Deserialize, Serialize};

use crate::types::{SyncRecord, SyncStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub synced: usize,
    pub pending: usize,
    pub failed: usize,
}

impl SyncSummary {
    pub fn from_records(records: &[SyncRecord]) -> Self {
        records
            .iter()
            .fold(Self::default(), |mut summary, record| {
                match record.status {
                    SyncStatus::Synced => summary.synced += 1,
                    SyncStatus::Pending => summary.pending += 1,
                    SyncStatus::Failed => summary.failed += 1,
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.synced + self.pending + self.failed
    }
}
