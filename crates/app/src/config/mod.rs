use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub const DEFAULT_MAX_COMPRESSIONS_PER_KEY: u64 = 500;
pub const DEFAULT_MAX_WIDTH: u32 = 1920;
const PLACEHOLDER_KEY_PREFIX: &str = "your-api-key";

/// User-editable settings for a compression run.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CompressorConfig {
    pub api_keys: Vec<String>,
    pub source_folder: PathBuf,
    pub output_folder: PathBuf,
    pub max_compressions_per_key: u64,
    pub max_width: u32,
    pub enable_resize: bool,
    pub supported_formats: Vec<String>,
    pub api_base: String,
    pub state_dir: PathBuf,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            api_keys: (1..=3)
                .map(|index| format!("{PLACEHOLDER_KEY_PREFIX}-{index}"))
                .collect(),
            source_folder: PathBuf::from("./images"),
            output_folder: PathBuf::from("./compressed_images"),
            max_compressions_per_key: DEFAULT_MAX_COMPRESSIONS_PER_KEY,
            max_width: DEFAULT_MAX_WIDTH,
            enable_resize: true,
            supported_formats: [".jpg", ".jpeg", ".png", ".webp"]
                .iter()
                .map(|value| value.to_string())
                .collect(),
            api_base: compress::DEFAULT_API_BASE.to_string(),
            state_dir: PathBuf::from("."),
        }
    }
}

impl CompressorConfig {
    /// `None` when local resizing is switched off.
    pub fn resize_width(&self) -> Option<u32> {
        self.enable_resize.then_some(self.max_width)
    }

    pub fn has_placeholder_keys(&self) -> bool {
        self.api_keys
            .iter()
            .any(|key| key.starts_with(PLACEHOLDER_KEY_PREFIX))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_width == 0 && self.enable_resize {
            return Err(AppError::InvalidInput(
                "max_width must be greater than 0 when resizing is enabled".to_string(),
            ));
        }
        if self.supported_formats.is_empty() {
            return Err(AppError::InvalidInput(
                "supported_formats must list at least one extension".to_string(),
            ));
        }
        Ok(())
    }
}
