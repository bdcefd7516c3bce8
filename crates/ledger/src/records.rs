use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tinybatch_core::CompressionRecord;

use crate::error::Result;
use crate::store;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RecordFile {
    compressed_files: HashMap<String, CompressionRecord>,
}

#[derive(Serialize)]
struct RecordFileRef<'a> {
    compressed_files: BTreeMap<&'a str, &'a CompressionRecord>,
}

/// Fingerprint-keyed log of finished compressions.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    records: HashMap<String, CompressionRecord>,
}

impl RecordStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file: RecordFile = store::load_or_default(&path)?;
        Ok(Self {
            path,
            records: file.compressed_files,
        })
    }

    pub fn has(&self, fingerprint: &str) -> bool {
        self.records.contains_key(fingerprint)
    }

    pub fn get(&self, fingerprint: &str) -> Option<&CompressionRecord> {
        self.records.get(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Inserts or replaces the record and writes the whole store before returning.
    pub fn record(&mut self, fingerprint: &str, record: CompressionRecord) -> Result<()> {
        let previous = self.records.insert(fingerprint.to_string(), record);
        if let Err(err) = self.persist() {
            match previous {
                Some(previous) => {
                    self.records.insert(fingerprint.to_string(), previous);
                }
                None => {
                    self.records.remove(fingerprint);
                }
            }
            return Err(err);
        }
        Ok(())
    }

    pub fn persist(&self) -> Result<()> {
        let sorted = RecordFileRef {
            compressed_files: self
                .records
                .iter()
                .map(|(key, value)| (key.as_str(), value))
                .collect(),
        };
        store::write_json(&self.path, &sorted)
    }
}
