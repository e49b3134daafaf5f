//! Two-image operations: bitwise AND / OR / XOR and watermark compositing.

use super::color_matrix::ColorMatrix;
use super::core::blend_over_u8;
use crate::buffer::{Color, PixelBuffer};
use crate::error::{ImagingError, Result};

// ============================================================================
// Bitwise
// ============================================================================

/// Channel-wise bitwise AND. Both images must share dimensions.
pub fn and(first: &PixelBuffer, second: &PixelBuffer) -> Result<PixelBuffer> {
    bitwise(first, second, "and", |a, b| a & b)
}

/// Channel-wise bitwise OR. Both images must share dimensions.
pub fn or(first: &PixelBuffer, second: &PixelBuffer) -> Result<PixelBuffer> {
    bitwise(first, second, "or", |a, b| a | b)
}

/// Channel-wise bitwise XOR. Both images must share dimensions.
pub fn xor(first: &PixelBuffer, second: &PixelBuffer) -> Result<PixelBuffer> {
    bitwise(first, second, "xor", |a, b| a ^ b)
}

/// Combine R, G and B of two equally sized images; alpha comes from `first`.
fn bitwise<F>(first: &PixelBuffer, second: &PixelBuffer, what: &str, op: F) -> Result<PixelBuffer>
where
    F: Fn(u8, u8) -> u8,
{
    if !first.same_dimensions(second) {
        let (w1, h1) = first.dimensions();
        let (w2, h2) = second.dimensions();
        return Err(ImagingError::invalid(format!(
            "{} needs equally sized images, got {}x{} and {}x{}",
            what, w1, h1, w2, h2
        )));
    }

    let mut output = first.with_alpha_of();
    for y in 0..first.height() {
        for x in 0..first.width() {
            let (a, b) = (first.pixel(x, y), second.pixel(x, y));
            output.put_rgb(x, y, op(a.r, b.r), op(a.g, b.g), op(a.b, b.b));
        }
    }
    Ok(output)
}

// ============================================================================
// Watermark
// ============================================================================

/// Alpha-blend `mark` onto a copy of `base` with its top-left at `(x, y)`.
///
/// Watermark alpha is scaled by `opacity`. Pixels whose RGB equals `key` are
/// skipped. Parts of the mark that fall outside `base` are clipped.
///
/// # Arguments
/// * `base` - Background image
/// * `mark` - Image to overlay
/// * `opacity` - 0.0 (invisible) to 1.0
/// * `x`, `y` - Placement of the mark's top-left corner, may be negative
/// * `key` - Optional transparent color
pub fn watermark(
    base: &PixelBuffer,
    mark: &PixelBuffer,
    opacity: f32,
    x: i64,
    y: i64,
    key: Option<Color>,
) -> Result<PixelBuffer> {
    if !(0.0..=1.0).contains(&opacity) {
        return Err(ImagingError::invalid(format!(
            "watermark opacity must be within 0.0-1.0, got {}",
            opacity
        )));
    }
    let fade = ColorMatrix::opacity(opacity);
    let (width, height) = (base.width() as i64, base.height() as i64);
    let mut output = base.clone();

    for my in 0..mark.height() {
        let ty = y + my as i64;
        if ty < 0 || ty >= height {
            continue;
        }
        for mx in 0..mark.width() {
            let tx = x + mx as i64;
            if tx < 0 || tx >= width {
                continue;
            }
            let src = mark.pixel(mx, my);
            if key.is_some_and(|k| (k.r, k.g, k.b) == (src.r, src.g, src.b)) {
                continue;
            }
            let src = fade.transform(src);
            let (tx, ty) = (tx as usize, ty as usize);
            let dst = output.pixel(tx, ty);
            let mut px = [dst.r, dst.g, dst.b, output.alpha(tx, ty)];
            blend_over_u8(&mut px, src.r, src.g, src.b, src.a);
            output.put(tx, ty, Color::rgba(px[0], px[1], px[2], px[3]));
        }
    }
    Ok(output)
}
