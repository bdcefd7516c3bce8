use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::types::Result;

fn normalize_extension(value: &str) -> String {
    value.trim().trim_start_matches('.').to_ascii_lowercase()
}

fn has_supported_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|value| value.to_str()) else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    extensions.iter().any(|candidate| *candidate == ext)
}

/// Every file under `root` whose extension is in `extensions`, sorted by path.
/// Extensions match case-insensitively, with or without a leading dot.
pub fn collect_images(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("source folder does not exist: {}", root.display()),
        )
        .into());
    }
    let extensions: Vec<String> = extensions
        .iter()
        .map(|value| normalize_extension(value))
        .collect();

    let mut images = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let file_path = err
                    .path()
                    .map(|path| path.to_string_lossy().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                tracing::warn!(path = %file_path, "skipping unreadable entry: {}", err);
                continue;
            }
        };
        if entry.file_type().is_file() && has_supported_extension(entry.path(), &extensions) {
            images.push(entry.into_path());
        }
    }
    Ok(images)
}

/// Mirrors `source` from `source_root` into `output_root`.
pub fn output_path_for(source: &Path, source_root: &Path, output_root: &Path) -> PathBuf {
    match source.strip_prefix(source_root) {
        Ok(relative) => output_root.join(relative),
        Err(_) => output_root.join(source.file_name().unwrap_or(source.as_os_str())),
    }
}
