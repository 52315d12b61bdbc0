//! I/O helpers for grayscale images, debug overlays and JSON.
//!
//! - `load_grayscale_image`: read a PNG/JPEG/TIFF into an owned 8-bit buffer.
//! - `save_grayscale_u8`: write an `ImageU8` to a PNG.
//! - `save_rgb`: write an RGB overlay (e.g. Hough lines over a stage image).
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::ImageU8;
use image::RgbImage;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk and convert to 8-bit grayscale.
pub fn load_grayscale_image(path: &Path) -> Result<ImageU8, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_luma8();
    Ok(ImageU8::from_gray_image(&img))
}

/// Save an 8-bit grayscale buffer to a PNG.
pub fn save_grayscale_u8(buffer: &ImageU8, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    buffer
        .to_gray_image()
        .save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Save an RGB image to a PNG.
pub fn save_rgb(image: &RgbImage, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    image
        .save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
