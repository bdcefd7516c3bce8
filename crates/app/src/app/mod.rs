use std::path::PathBuf;

use crate::config::CompressorConfig;
use crate::error::Result;
use crate::services::AppServices;
use crate::startup::{self, AppPaths};

/// Settings and file locations needed for a run.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub settings: CompressorConfig,
    pub paths: AppPaths,
}

/// Application state shared by the CLI entry points.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    pub fn new(settings: CompressorConfig) -> Self {
        let paths = AppPaths::new(settings.state_dir.clone());
        let config = AppConfig { settings, paths };
        let services = AppServices::new(&config);
        Self { config, services }
    }

    /// Creates the state directory and migrates a legacy log if one is found.
    pub fn initialize(&self) -> Result<Option<PathBuf>> {
        self.config.settings.validate()?;
        startup::ensure_state_dir(&self.config.paths)?;
        startup::migrate_legacy_log(&self.config.paths)
    }
}
