use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use tempfile::TempPath;

use crate::types::Result;

const JPEG_QUALITY: u8 = 95;

/// Input handed to the remote service: the original file, or a downscaled
/// temporary copy that is deleted when this value is dropped.
#[derive(Debug)]
pub enum PreparedInput {
    Original(PathBuf),
    Resized(TempPath),
}

impl PreparedInput {
    pub fn path(&self) -> &Path {
        match self {
            Self::Original(path) => path.as_path(),
            Self::Resized(temp) => &**temp,
        }
    }

    pub fn was_resized(&self) -> bool {
        matches!(self, Self::Resized(_))
    }
}

/// Local preprocessing before upload. Never fails: on any problem the
/// original path is returned unchanged.
pub trait Resizer {
    fn prepare(&self, source: &Path, max_width: u32) -> PreparedInput;
}

/// Passes every file through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResize;

impl Resizer for NoResize {
    fn prepare(&self, source: &Path, _max_width: u32) -> PreparedInput {
        PreparedInput::Original(source.to_path_buf())
    }
}

/// Proportional Lanczos3 downscale to `max_width` using the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageResizer;

impl Resizer for ImageResizer {
    fn prepare(&self, source: &Path, max_width: u32) -> PreparedInput {
        match downscale(source, max_width) {
            Ok(Some(temp)) => PreparedInput::Resized(temp),
            Ok(None) => PreparedInput::Original(source.to_path_buf()),
            Err(err) => {
                tracing::warn!(
                    path = %source.display(),
                    "local resize failed, uploading the original: {}",
                    err
                );
                PreparedInput::Original(source.to_path_buf())
            }
        }
    }
}

pub fn scaled_height(width: u32, height: u32, max_width: u32) -> u32 {
    let scaled = (height as u64 * max_width as u64) / width.max(1) as u64;
    scaled.max(1) as u32
}

fn downscale(source: &Path, max_width: u32) -> Result<Option<TempPath>> {
    let (width, height) = image::image_dimensions(source)?;
    if width <= max_width {
        return Ok(None);
    }
    let new_height = scaled_height(width, height, max_width);
    tracing::info!(
        "resizing locally: {}x{} -> {}x{}",
        width,
        height,
        max_width,
        new_height
    );

    let img = image::open(source)?;
    let resized = img.resize_exact(max_width, new_height, FilterType::Lanczos3);
    let ext = source
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();

    let mut buffer = Cursor::new(Vec::new());
    match ext.as_str() {
        "jpg" | "jpeg" => {
            let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
            DynamicImage::ImageRgb8(resized.to_rgb8()).write_with_encoder(encoder)?;
        }
        "png" => resized.write_to(&mut buffer, ImageFormat::Png)?,
        "webp" => resized.write_to(&mut buffer, ImageFormat::WebP)?,
        _ => resized.write_to(&mut buffer, ImageFormat::from_path(source)?)?,
    }

    let mut temp = tempfile::Builder::new()
        .prefix("tinybatch-")
        .suffix(&format!(".{ext}"))
        .tempfile()?;
    temp.write_all(buffer.get_ref())?;
    temp.flush()?;
    Ok(Some(temp.into_temp_path()))
}
