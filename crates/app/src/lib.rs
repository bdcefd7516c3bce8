pub mod app;
pub mod config;
pub mod error;
pub mod services;
pub mod startup;

pub use app::{AppConfig, AppState};
pub use config::CompressorConfig;
pub use error::{AppError, Result};
pub use services::{AppServices, CompressSession, StatusSnapshot};
pub use startup::{AppPaths, ensure_state_dir, migrate_legacy_log};
