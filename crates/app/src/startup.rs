use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tinybatch_ledger::{LedgerPaths, QuotaState};

use crate::Result;

#[derive(Clone, Debug)]
pub struct AppPaths {
    pub state_dir: PathBuf,
    pub ledger: LedgerPaths,
}

impl AppPaths {
    pub fn new(state_dir: PathBuf) -> Self {
        let ledger = LedgerPaths::in_dir(&state_dir);
        Self { state_dir, ledger }
    }
}

pub fn ensure_state_dir(paths: &AppPaths) -> Result<()> {
    fs::create_dir_all(&paths.state_dir)?;
    Ok(())
}

/// Older logs kept the quota counters next to `compressed_files` in one file.
#[derive(Deserialize)]
struct LegacyLog {
    key_usage: Option<serde_json::Value>,
}

/// Splits quota counters out of a single-file compression log into the quota
/// file. Returns the path written, if any. The records file keeps loading as
/// is; its extra fields are dropped on the next write.
pub fn migrate_legacy_log(paths: &AppPaths) -> Result<Option<PathBuf>> {
    migrate_legacy_log_paths(&paths.ledger.records, &paths.ledger.quota)
}

fn migrate_legacy_log_paths(records_path: &Path, quota_path: &Path) -> Result<Option<PathBuf>> {
    if quota_path.exists() || !records_path.exists() {
        return Ok(None);
    }
    let data = fs::read(records_path)?;
    let legacy: LegacyLog = serde_json::from_slice(&data)?;
    if legacy.key_usage.is_none() {
        return Ok(None);
    }
    let quota: QuotaState = serde_json::from_slice(&data)?;
    let contents = serde_json::to_vec_pretty(&quota)?;
    tinybatch_ledger::atomic_write(quota_path, &contents)?;
    tracing::info!(
        from = %records_path.display(),
        to = %quota_path.display(),
        "moved api key usage out of the legacy compression log"
    );
    Ok(Some(quota_path.to_path_buf()))
}
