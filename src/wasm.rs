//! WebAssembly exports for pixelmill filters.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Images cross
//! the boundary as flat RGBA bytes (`ImageData.data` layout, length
//! `width * height * 4`). Parameter errors surface as thrown JS strings.

use wasm_bindgen::prelude::*;

use crate::buffer::PixelBuffer;
use crate::error::ImagingError;
use crate::filters::{blur, color_adjust, edge, noise, stylize};
use crate::geometry::{self, Quality};
use crate::perlin::PerlinNoise;

fn js_error(err: ImagingError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn rgba(data: &[u8], width: usize, height: usize) -> Result<PixelBuffer, JsValue> {
    PixelBuffer::from_raw(width, height, 4, data.to_vec()).map_err(js_error)
}

fn into_bytes(buffer: PixelBuffer) -> Vec<u8> {
    buffer.into_array().into_raw_vec_and_offset().0
}

// ============================================================================
// Point Operations
// ============================================================================

/// Luminance grayscale.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// # Returns
/// Flat array of RGBA bytes, alpha unchanged
#[wasm_bindgen]
pub fn grayscale_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsValue> {
    Ok(into_bytes(color_adjust::grayscale(&rgba(data, width, height)?)))
}

/// Invert R, G and B.
#[wasm_bindgen]
pub fn negative_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsValue> {
    Ok(into_bytes(color_adjust::negative(&rgba(data, width, height)?)))
}

/// Shift brightness by `value` (-255 to 255).
#[wasm_bindgen]
pub fn brightness_wasm(data: &[u8], width: usize, height: usize, value: i32) -> Result<Vec<u8>, JsValue> {
    Ok(into_bytes(color_adjust::brightness(&rgba(data, width, height)?, value)))
}

/// Scale contrast by `value` (-100 to 100).
#[wasm_bindgen]
pub fn contrast_wasm(data: &[u8], width: usize, height: usize, value: f32) -> Result<Vec<u8>, JsValue> {
    Ok(into_bytes(color_adjust::contrast(&rgba(data, width, height)?, value)))
}

/// Apply a gamma curve; `gamma` must be positive.
#[wasm_bindgen]
pub fn gamma_wasm(data: &[u8], width: usize, height: usize, gamma: f32) -> Result<Vec<u8>, JsValue> {
    let out = color_adjust::gamma(&rgba(data, width, height)?, gamma).map_err(js_error)?;
    Ok(into_bytes(out))
}

// ============================================================================
// Blur / Edges
// ============================================================================

/// Box blur with an odd aperture.
#[wasm_bindgen]
pub fn box_blur_wasm(data: &[u8], width: usize, height: usize, size: usize) -> Result<Vec<u8>, JsValue> {
    let out = blur::box_blur(&rgba(data, width, height)?, size).map_err(js_error)?;
    Ok(into_bytes(out))
}

/// Gaussian approximation by three box passes.
#[wasm_bindgen]
pub fn gaussian_blur_wasm(data: &[u8], width: usize, height: usize, size: usize) -> Result<Vec<u8>, JsValue> {
    let out = blur::gaussian_blur(&rgba(data, width, height)?, size).map_err(js_error)?;
    Ok(into_bytes(out))
}

/// Sobel edge magnitude, dark edges on white.
#[wasm_bindgen]
pub fn sobel_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsValue> {
    Ok(into_bytes(edge::sobel(&rgba(data, width, height)?)))
}

/// Sharpen kernel.
#[wasm_bindgen]
pub fn sharpen_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsValue> {
    Ok(into_bytes(edge::sharpen(&rgba(data, width, height)?)))
}

/// Emboss kernel.
#[wasm_bindgen]
pub fn emboss_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsValue> {
    Ok(into_bytes(edge::emboss(&rgba(data, width, height)?)))
}

// ============================================================================
// Stylize / Noise
// ============================================================================

/// Block mosaic, `pixel_size` at least 2.
#[wasm_bindgen]
pub fn pixelate_wasm(data: &[u8], width: usize, height: usize, pixel_size: usize) -> Result<Vec<u8>, JsValue> {
    let out = stylize::pixelate(&rgba(data, width, height)?, pixel_size).map_err(js_error)?;
    Ok(into_bytes(out))
}

/// Uniform per-channel noise, reproducible by `seed`.
#[wasm_bindgen]
pub fn add_noise_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    amount: u8,
    seed: u64,
) -> Result<Vec<u8>, JsValue> {
    Ok(into_bytes(noise::add_noise(&rgba(data, width, height)?, amount, seed)))
}

/// Perlin noise texture as opaque RGBA.
#[wasm_bindgen]
pub fn perlin_noise_wasm(width: usize, height: usize, octaves: u32, seed: u64) -> Result<Vec<u8>, JsValue> {
    let texture = PerlinNoise {
        octaves,
        seed,
        ..Default::default()
    }
    .generate(width, height)
    .map_err(js_error)?;
    let mut out = Vec::with_capacity(width * height * 4);
    for px in texture.to_raw().chunks_exact(3) {
        out.extend_from_slice(px);
        out.push(255);
    }
    Ok(out)
}

// ============================================================================
// Geometry
// ============================================================================

/// Resample to `new_width` x `new_height`; `high_quality` selects bicubic.
#[wasm_bindgen]
pub fn resize_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    new_width: usize,
    new_height: usize,
    high_quality: bool,
) -> Result<Vec<u8>, JsValue> {
    let quality = if high_quality { Quality::High } else { Quality::Low };
    let out = geometry::resize(&rgba(data, width, height)?, new_width, new_height, quality)
        .map_err(js_error)?;
    Ok(into_bytes(out))
}

/// Rotate clockwise about the center, same canvas size.
#[wasm_bindgen]
pub fn rotate_wasm(data: &[u8], width: usize, height: usize, degrees: f32) -> Result<Vec<u8>, JsValue> {
    Ok(into_bytes(geometry::rotate(&rgba(data, width, height)?, degrees)))
}

/// Mirror horizontally and/or vertically.
#[wasm_bindgen]
pub fn flip_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    flip_x: bool,
    flip_y: bool,
) -> Result<Vec<u8>, JsValue> {
    Ok(into_bytes(geometry::flip(&rgba(data, width, height)?, flip_x, flip_y)))
}
