use std::fs;
use std::path::Path;

use chrono::Utc;
use tinybatch_core::{CompressionRecord, compression_ratio, format_ratio, truncate_credential};
use tinybatch_ledger::Ledger;

use crate::fingerprint::fingerprint;
use crate::remote::Compressor;
use crate::resize::{NoResize, Resizer};
use crate::types::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub max_per_credential: u64,
    /// `None` disables local resizing.
    pub max_width: Option<u32>,
}

/// Result of one successful compression.
#[derive(Debug, Clone, PartialEq)]
pub struct Compressed {
    pub fingerprint: String,
    pub record: CompressionRecord,
    pub resized: bool,
    pub remaining: u64,
}

/// Runs one image through rotation, resize, upload and bookkeeping.
pub struct CompressionPipeline<'a> {
    compressor: &'a dyn Compressor,
    resizer: &'a dyn Resizer,
    settings: PipelineSettings,
}

impl<'a> CompressionPipeline<'a> {
    pub fn new(
        compressor: &'a dyn Compressor,
        resizer: &'a dyn Resizer,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            compressor,
            resizer,
            settings,
        }
    }

    /// Compresses `source` into `output`, fingerprinting the original first.
    pub fn process(&self, ledger: &mut Ledger, source: &Path, output: &Path) -> Result<Compressed> {
        // Dedup identity comes from the original bytes, never the resized copy.
        let digest = fingerprint(source)?;
        self.process_fingerprinted(ledger, source, digest, output)
    }

    /// Like [`process`](Self::process) for a caller that already hashed
    /// `source`. The ledger is only touched after the remote call succeeded.
    /// Rotation, when due, happens before anything else.
    pub fn process_fingerprinted(
        &self,
        ledger: &mut Ledger,
        source: &Path,
        fingerprint: String,
        output: &Path,
    ) -> Result<Compressed> {
        let active = ledger
            .quota
            .check_and_rotate(self.settings.max_per_credential)?;

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        let original_size = fs::metadata(source)?.len();

        // The temporary resized copy, if any, is removed when `input` drops,
        // including on the error path.
        let (compressed_size, resized) = {
            let input = match self.settings.max_width {
                Some(max_width) => self.resizer.prepare(source, max_width),
                None => NoResize.prepare(source, 0),
            };
            let resized = input.was_resized();
            let size = self
                .compressor
                .compress(&active.credential, input.path(), output)?;
            (size, resized)
        };

        let timestamp = Utc::now().to_rfc3339();
        let ratio = compression_ratio(original_size, compressed_size);
        let record = CompressionRecord {
            source_path: source.to_string_lossy().to_string(),
            output_path: output.to_string_lossy().to_string(),
            original_size,
            compressed_size,
            compression_ratio: format_ratio(ratio),
            compressed_at: timestamp.clone(),
            api_key_index: active.index,
            api_key_used: truncate_credential(&active.credential),
        };

        ledger.quota.record_success(&active.credential, &timestamp)?;
        ledger.records.record(&fingerprint, record.clone())?;

        let remaining = ledger
            .quota
            .remaining(&active.credential, self.settings.max_per_credential);
        Ok(Compressed {
            fingerprint,
            record,
            resized,
            remaining,
        })
    }
}
