use serde::Serialize;
use tinybatch_core::CredentialStatus;
use tinybatch_ledger::Ledger;

use crate::error::Result;
use crate::services::{SharedConfig, open_ledger};

/// Point-in-time view of key usage and the compression log.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub keys: Vec<CredentialStatus>,
    pub limit: u64,
    pub total_compressions: u64,
    pub last_run_time: Option<String>,
    pub compressed_files: usize,
}

impl StatusSnapshot {
    pub fn from_ledger(ledger: &Ledger, limit: u64) -> Self {
        Self {
            keys: ledger.quota.status(limit),
            limit,
            total_compressions: ledger.quota.total_compressions(),
            last_run_time: ledger.quota.state().last_run_time.clone(),
            compressed_files: ledger.records.len(),
        }
    }
}

#[derive(Clone)]
pub struct StatusService {
    config: SharedConfig,
}

impl StatusService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    /// Reads the stores as they are on disk, without repairs.
    pub fn snapshot(&self) -> Result<StatusSnapshot> {
        let ledger = open_ledger(&self.config)?;
        Ok(StatusSnapshot::from_ledger(
            &ledger,
            self.config.settings.max_compressions_per_key,
        ))
    }
}
