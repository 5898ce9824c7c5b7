//! Image preparation before upload
//!
//! Menu photos straight off a phone camera are far larger than the OCR
//! service needs. Downscaling and re-encoding as JPEG keeps uploads fast
//! without hurting recognition of menu-sized print.

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

use crate::config::PreprocessSettings;

/// Decode, downscale, and re-encode an image per the preprocessing
/// settings. Disabled preprocessing passes the bytes through untouched.
pub fn prepare_for_upload(bytes: &[u8], settings: &PreprocessSettings) -> Result<Vec<u8>> {
    if !settings.enabled {
        debug!("upload preprocessing disabled");
        return Ok(bytes.to_vec());
    }

    let mut image = image::load_from_memory(bytes).context("Failed to decode image")?;

    if image.width() > settings.max_width {
        let scale = settings.max_width as f32 / image.width() as f32;
        let height = ((image.height() as f32 * scale).round() as u32).max(1);
        debug!(
            "downscaling {}x{} -> {}x{}",
            image.width(),
            image.height(),
            settings.max_width,
            height
        );
        image = image.resize_exact(settings.max_width, height, FilterType::Triangle);
    }

    if settings.grayscale {
        image = DynamicImage::ImageLuma8(image.to_luma8());
    }

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut out), settings.jpeg_quality);
    image
        .write_with_encoder(encoder)
        .context("Failed to encode JPEG")?;

    debug!("prepared {} byte upload from {} byte image", out.len(), bytes.len());

    Ok(out)
}
