use std::path::{Path, PathBuf};

use chrono::Utc;
use tinybatch_core::{FailedItem, FailureKind, RunStats};
use tinybatch_ledger::Ledger;

use crate::fingerprint::fingerprint;
use crate::pipeline::CompressionPipeline;
use crate::scan::output_path_for;

/// Source and destination roots of a batch.
#[derive(Debug, Clone)]
pub struct BatchRoots {
    pub source: PathBuf,
    pub output: PathBuf,
}

/// Processes `images` in order. Already-recorded content is skipped; every
/// other failure is counted and the loop moves on.
pub fn run_batch(
    ledger: &mut Ledger,
    pipeline: &CompressionPipeline<'_>,
    images: &[PathBuf],
    roots: &BatchRoots,
) -> RunStats {
    let mut stats = RunStats {
        total: images.len(),
        ..RunStats::default()
    };

    for (position, image) in images.iter().enumerate() {
        tracing::info!("[{}/{}] {}", position + 1, stats.total, image.display());
        let digest = match fingerprint(image) {
            Ok(digest) => digest,
            Err(err) => {
                fail(&mut stats, image, FailureKind::Io, err.to_string());
                continue;
            }
        };
        if let Some(previous) = ledger.records.get(&digest) {
            tracing::info!(
                path = %image.display(),
                output = %previous.output_path,
                "skipped, already compressed"
            );
            stats.skipped += 1;
            continue;
        }

        let output = output_path_for(image, &roots.source, &roots.output);
        match pipeline.process_fingerprinted(ledger, image, digest, &output) {
            Ok(done) => {
                tracing::info!(
                    resized = done.resized,
                    remaining = done.remaining,
                    "compressed {}: {:.2} KB -> {:.2} KB ({})",
                    file_label(image),
                    done.record.original_size as f64 / 1024.0,
                    done.record.compressed_size as f64 / 1024.0,
                    done.record.compression_ratio
                );
                stats.compressed += 1;
            }
            Err(err) => fail(&mut stats, image, err.kind(), err.to_string()),
        }
    }

    if let Err(err) = ledger.quota.record_run(&Utc::now().to_rfc3339()) {
        tracing::warn!("failed to record run time: {}", err);
    }
    stats
}

fn fail(stats: &mut RunStats, image: &Path, kind: FailureKind, message: String) {
    tracing::error!(path = %image.display(), "[{}] {}", kind.label(), message);
    stats.record_failure(FailedItem {
        path: image.to_string_lossy().to_string(),
        kind,
        message,
    });
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
