mod error;
mod quota;
mod reconcile;
mod records;
mod store;

use std::path::{Path, PathBuf};

pub use error::{LedgerError, Result};
pub use quota::{ActiveCredential, QuotaLedger, QuotaState};
pub use reconcile::ReconcileReport;
pub use records::RecordStore;
pub use store::atomic_write;

pub const QUOTA_FILE_NAME: &str = "quota.json";
pub const RECORDS_FILE_NAME: &str = "compression_log.json";

#[derive(Clone, Debug)]
pub struct LedgerPaths {
    pub quota: PathBuf,
    pub records: PathBuf,
}

impl LedgerPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            quota: dir.join(QUOTA_FILE_NAME),
            records: dir.join(RECORDS_FILE_NAME),
        }
    }
}

/// Both durable stores of a run, loaded together.
#[derive(Debug)]
pub struct Ledger {
    pub quota: QuotaLedger,
    pub records: RecordStore,
}

impl Ledger {
    pub fn open(paths: &LedgerPaths, credentials: Vec<String>) -> Result<Self> {
        Ok(Self {
            quota: QuotaLedger::open(&paths.quota, credentials)?,
            records: RecordStore::open(&paths.records)?,
        })
    }

    /// Opens the stores and runs the startup repairs.
    pub fn open_reconciled(
        paths: &LedgerPaths,
        credentials: Vec<String>,
        max_per_credential: u64,
    ) -> Result<(Self, ReconcileReport)> {
        let mut ledger = Self::open(paths, credentials)?;
        let report = ledger.quota.reconcile(max_per_credential)?;
        Ok((ledger, report))
    }
}
