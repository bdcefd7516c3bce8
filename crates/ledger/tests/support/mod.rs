#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;
use tinybatch_core::CompressionRecord;
use tinybatch_ledger::{LedgerPaths, QuotaLedger, QuotaState, RecordStore};

pub struct TestState {
    pub _dir: TempDir,
    pub paths: LedgerPaths,
}

pub fn setup_state() -> TestState {
    let dir = tempfile::tempdir().expect("temp dir");
    let paths = LedgerPaths::in_dir(dir.path());
    TestState { _dir: dir, paths }
}

pub fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

pub fn open_quota(state: &TestState, names: &[&str]) -> QuotaLedger {
    QuotaLedger::open(&state.paths.quota, keys(names)).expect("open quota")
}

pub fn open_records(state: &TestState) -> RecordStore {
    RecordStore::open(&state.paths.records).expect("open records")
}

pub fn write_quota(state: &TestState, quota: &QuotaState) {
    let data = serde_json::to_vec_pretty(quota).expect("serialize quota");
    std::fs::write(&state.paths.quota, data).expect("write quota");
}

pub fn read_quota(path: &PathBuf) -> QuotaState {
    let data = std::fs::read(path).expect("read quota");
    serde_json::from_slice(&data).expect("parse quota")
}

pub fn quota_with_usage(usage: &[(&str, u64)], index: usize, total: u64) -> QuotaState {
    let mut quota = QuotaState {
        current_key_index: index,
        total_compressions: total,
        ..QuotaState::default()
    };
    for (key, count) in usage {
        quota.key_usage.insert(key.to_string(), *count);
        quota.key_details.insert(key.to_string(), Default::default());
    }
    quota
}

pub fn make_record(source: &str, original: u64, compressed: u64) -> CompressionRecord {
    CompressionRecord {
        source_path: source.to_string(),
        output_path: format!("out/{source}"),
        original_size: original,
        compressed_size: compressed,
        compression_ratio: tinybatch_core::format_ratio(tinybatch_core::compression_ratio(
            original, compressed,
        )),
        compressed_at: "2025-01-01T00:00:00+00:00".to_string(),
        api_key_index: 0,
        api_key_used: "key-a...".to_string(),
    }
}
