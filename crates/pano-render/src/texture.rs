//! Panorama decoding. Runs off the render thread on native, so it only
//! touches CPU memory.

use crate::error::RenderError;
use image::imageops::FilterType;

/// Decoded RGBA8 pixels ready for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanoramaImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Decodes a JPEG or PNG panorama and shrinks it, keeping the aspect
/// ratio, when either side exceeds `max_dimension`.
pub fn decode_panorama(bytes: &[u8], max_dimension: u32) -> Result<PanoramaImage, RenderError> {
    let mut rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (w, h) = rgba.dimensions();
    if w == 0 || h == 0 {
        return Err(RenderError::EmptyImage);
    }
    let max_dimension = max_dimension.max(1);
    if w > max_dimension || h > max_dimension {
        let scale = max_dimension as f32 / w.max(h) as f32;
        let nw = ((w as f32 * scale).round() as u32).clamp(1, max_dimension);
        let nh = ((h as f32 * scale).round() as u32).clamp(1, max_dimension);
        log::warn!(
            "[render] panorama {}x{} exceeds GPU limit {}, downscaling to {}x{}",
            w,
            h,
            max_dimension,
            nw,
            nh
        );
        rgba = image::imageops::resize(&rgba, nw, nh, FilterType::Triangle);
    }
    let (width, height) = rgba.dimensions();
    Ok(PanoramaImage {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}
