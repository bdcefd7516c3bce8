use compress::{
    BatchRoots, CompressionPipeline, Compressor, PipelineSettings, Resizer, collect_images,
    run_batch,
};
use tinybatch_core::RunStats;
use tinybatch_ledger::{Ledger, ReconcileReport};

use crate::error::Result;
use crate::services::status::StatusSnapshot;
use crate::services::{SharedConfig, open_reconciled};

#[derive(Clone)]
pub struct CompressService {
    config: SharedConfig,
}

impl CompressService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    /// Loads both stores and applies the startup repairs.
    pub fn open(&self) -> Result<CompressSession> {
        let (ledger, report) = open_reconciled(&self.config)?;
        log_report(&report);
        Ok(CompressSession {
            config: self.config.clone(),
            ledger,
            report,
        })
    }
}

/// A reconciled ledger ready to process the configured source folder.
pub struct CompressSession {
    config: SharedConfig,
    ledger: Ledger,
    pub report: ReconcileReport,
}

impl CompressSession {
    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot::from_ledger(&self.ledger, self.config.settings.max_compressions_per_key)
    }

    /// Scans the source folder and compresses everything not yet recorded.
    pub fn run_with(
        &mut self,
        compressor: &dyn Compressor,
        resizer: &dyn Resizer,
    ) -> Result<RunStats> {
        let settings = &self.config.settings;
        tracing::info!(folder = %settings.source_folder.display(), "scanning for images");
        let images = collect_images(&settings.source_folder, &settings.supported_formats)?;
        if images.is_empty() {
            tracing::warn!("no images found");
            return Ok(RunStats::default());
        }
        tracing::info!(count = images.len(), "found images");

        let pipeline = CompressionPipeline::new(
            compressor,
            resizer,
            PipelineSettings {
                max_per_credential: settings.max_compressions_per_key,
                max_width: settings.resize_width(),
            },
        );
        let roots = BatchRoots {
            source: settings.source_folder.clone(),
            output: settings.output_folder.clone(),
        };
        Ok(run_batch(&mut self.ledger, &pipeline, &images, &roots))
    }
}

fn log_report(report: &ReconcileReport) {
    if report.is_clean() {
        return;
    }
    tracing::info!(
        replaced = report.credentials_replaced,
        pruned = report.pruned,
        index_reset_from = ?report.index_reset_from,
        switched_to = ?report.switched_to,
        "reconciled api key usage with configuration"
    );
}
