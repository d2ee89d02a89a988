//! Alpha-mask ingestion
//!
//! Converts an RGBA image into a solidity bitmap: any pixel whose alpha is
//! strictly above the threshold becomes solid. Ground art usually wants a
//! high threshold (~250); anti-aliased crater/obstacle masks need a low one
//! (~10-50) or their soft edges vanish.

use std::path::Path;

use image::RgbaImage;

use super::buffer::TerrainBuffer;
use crate::error::SimError;

/// Build a buffer from an already decoded RGBA image
pub fn from_rgba(image: &RgbaImage, threshold: u8, diggable: bool) -> Result<TerrainBuffer, SimError> {
    let buffer = TerrainBuffer::from_fn(image.width(), image.height(), diggable, |x, y| {
        image.get_pixel(x as u32, y as u32)[3] > threshold
    })?;

    log::debug!(
        "Mask {}x{}: {} solid pixels (alpha > {})",
        image.width(),
        image.height(),
        buffer.count_solid(),
        threshold
    );
    Ok(buffer)
}

/// Build a buffer from a raw alpha plane (`width * height` bytes, row-major)
pub fn from_alpha(
    width: u32,
    height: u32,
    alpha: &[u8],
    threshold: u8,
    diggable: bool,
) -> Result<TerrainBuffer, SimError> {
    if alpha.len() < width as usize * height as usize {
        return Err(SimError::InvalidDimensions { width, height });
    }
    TerrainBuffer::from_fn(width, height, diggable, |x, y| {
        alpha[y as usize * width as usize + x as usize] > threshold
    })
}

/// Load an image file (PNG) and convert its alpha channel
pub fn load_mask(path: &Path, threshold: u8, diggable: bool) -> Result<TerrainBuffer, SimError> {
    let rgba = image::open(path)?.to_rgba8();
    log::info!(
        "Loaded mask {:?} ({}x{})",
        path.file_name().unwrap_or_default(),
        rgba.width(),
        rgba.height()
    );
    from_rgba(&rgba, threshold, diggable)
}
