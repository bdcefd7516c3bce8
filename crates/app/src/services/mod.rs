mod run;
mod status;

use std::sync::Arc;

use crate::app::AppConfig;
use crate::error::Result;
use tinybatch_ledger::{Ledger, ReconcileReport};

pub use run::{CompressService, CompressSession};
pub use status::{StatusService, StatusSnapshot};

type SharedConfig = Arc<AppConfig>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub compress: CompressService,
    pub status: StatusService,
}

impl AppServices {
    pub fn new(config: &AppConfig) -> Self {
        let shared = Arc::new(config.clone());
        Self {
            compress: CompressService::new(shared.clone()),
            status: StatusService::new(shared),
        }
    }
}

fn open_ledger(config: &SharedConfig) -> Result<Ledger> {
    Ok(Ledger::open(
        &config.paths.ledger,
        config.settings.api_keys.clone(),
    )?)
}

fn open_reconciled(config: &SharedConfig) -> Result<(Ledger, ReconcileReport)> {
    Ok(Ledger::open_reconciled(
        &config.paths.ledger,
        config.settings.api_keys.clone(),
        config.settings.max_compressions_per_key,
    )?)
}
