//! Point operations: Negative, Threshold, Brightness, Contrast, Gamma,
//! Colorize, color-matrix presets, Stretch Contrast, Equalize.
//!
//! These are pixel-wise operations that don't require spatial context.
//!
//! ## Supported Formats
//!
//! - **RGB**: (height, width, 3) - red, green, blue
//! - **RGBA**: (height, width, 4) - red, green, blue, alpha
//!
//! Alpha channel (if present) is always preserved unchanged.

use super::color_matrix::ColorMatrix;
use super::histogram::Histogram;
use crate::buffer::{Color, PixelBuffer};
use crate::error::{ImagingError, Result};

/// Map every pixel through `f`, keeping the source alpha.
fn map_pixels<F>(source: &PixelBuffer, mut f: F) -> PixelBuffer
where
    F: FnMut(Color) -> Color,
{
    let mut output = source.with_alpha_of();
    for y in 0..source.height() {
        for x in 0..source.width() {
            let c = f(source.pixel(x, y));
            output.put_rgb(x, y, c.r, c.g, c.b);
        }
    }
    output
}

// ============================================================================
// Negative / Threshold
// ============================================================================

/// Complement every color channel (`255 - v`).
pub fn negative(source: &PixelBuffer) -> PixelBuffer {
    map_pixels(source, |c| Color::rgb(255 - c.r, 255 - c.g, 255 - c.b))
}

/// Binarize on summed intensity.
///
/// A pixel becomes white when `(R + G + B) / 755 > threshold`, black otherwise.
///
/// # Arguments
/// * `source` - Image to binarize
/// * `threshold` - Cutoff, 0.0-1.0
pub fn threshold(source: &PixelBuffer, threshold: f32) -> PixelBuffer {
    map_pixels(source, |c| {
        let level = (c.r as f32 + c.g as f32 + c.b as f32) / 755.0;
        if level > threshold {
            Color::WHITE
        } else {
            Color::BLACK
        }
    })
}

// ============================================================================
// Color matrix presets
// ============================================================================

/// Shift R, G and B by `value` (8-bit units).
pub fn brightness(source: &PixelBuffer, value: i32) -> PixelBuffer {
    ColorMatrix::brightness(value).apply(source)
}

/// Quadratic contrast around mid-gray.
///
/// # Arguments
/// * `source` - Image to adjust
/// * `value` - -100 (flat gray) to 100, 0 = no change
pub fn contrast(source: &PixelBuffer, value: f32) -> PixelBuffer {
    ColorMatrix::contrast(value).apply(source)
}

/// Luminance grayscale ("black and white").
pub fn grayscale(source: &PixelBuffer) -> PixelBuffer {
    ColorMatrix::grayscale().apply(source)
}

pub fn sepia(source: &PixelBuffer) -> PixelBuffer {
    ColorMatrix::sepia().apply(source)
}

pub fn red_filter(source: &PixelBuffer) -> PixelBuffer {
    ColorMatrix::red_filter().apply(source)
}

pub fn green_filter(source: &PixelBuffer) -> PixelBuffer {
    ColorMatrix::green_filter().apply(source)
}

pub fn blue_filter(source: &PixelBuffer) -> PixelBuffer {
    ColorMatrix::blue_filter().apply(source)
}

// ============================================================================
// Gamma
// ============================================================================

/// 256-entry power-curve lookup: `round(255 * (v / 255)^(1 / gamma))`.
///
/// Entry 0 is always 0 and entry 255 is always 255.
pub fn gamma_ramp(gamma: f32) -> Result<[u8; 256]> {
    if gamma <= 0.0 || !gamma.is_finite() {
        return Err(ImagingError::invalid(format!(
            "gamma must be a positive finite value, got {}",
            gamma
        )));
    }
    let mut ramp = [0u8; 256];
    let exponent = 1.0 / gamma as f64;
    for (v, slot) in ramp.iter_mut().enumerate() {
        let value = 255.0 * (v as f64 / 255.0).powf(exponent);
        *slot = value.round().clamp(0.0, 255.0) as u8;
    }
    Ok(ramp)
}

/// Apply the gamma ramp to R, G and B.
pub fn gamma(source: &PixelBuffer, gamma: f32) -> Result<PixelBuffer> {
    let ramp = gamma_ramp(gamma)?;
    Ok(map_pixels(source, |c| {
        Color::rgb(ramp[c.r as usize], ramp[c.g as usize], ramp[c.b as usize])
    }))
}

// ============================================================================
// Colorize
// ============================================================================

/// Map the red channel of a grayscale image through a 256-entry palette.
///
/// # Arguments
/// * `source` - Grayscale image; only R is read
/// * `palette` - Exactly 256 colors, indexed by intensity
pub fn colorize(source: &PixelBuffer, palette: &[Color]) -> Result<PixelBuffer> {
    if palette.len() != 256 {
        return Err(ImagingError::invalid(format!(
            "colorize palette needs 256 entries, got {}",
            palette.len()
        )));
    }
    Ok(map_pixels(source, |c| palette[c.r as usize]))
}

// ============================================================================
// Stretch Contrast / Equalize
// ============================================================================

/// Stretch each channel's [min, max] range to [0, 255].
///
/// A channel with a single value is left as is.
pub fn stretch_contrast(source: &PixelBuffer) -> PixelBuffer {
    let mut lo = [255u8; 3];
    let mut hi = [0u8; 3];
    for y in 0..source.height() {
        for x in 0..source.width() {
            let c = source.pixel(x, y);
            for (i, v) in [c.r, c.g, c.b].into_iter().enumerate() {
                lo[i] = lo[i].min(v);
                hi[i] = hi[i].max(v);
            }
        }
    }

    let stretch = |v: u8, i: usize| -> u8 {
        if hi[i] == lo[i] {
            return v;
        }
        ((v - lo[i]) as u32 * 255 / (hi[i] - lo[i]) as u32) as u8
    };
    map_pixels(source, |c| Color::rgb(stretch(c.r, 0), stretch(c.g, 1), stretch(c.b, 2)))
}

/// Histogram equalization using the image's own histogram.
pub fn equalize(source: &PixelBuffer) -> PixelBuffer {
    equalize_with(source, source)
}

/// Remap `target` through the equalized histogram of `reference`.
pub fn equalize_with(reference: &PixelBuffer, target: &PixelBuffer) -> PixelBuffer {
    let mut histogram = Histogram::build(reference);
    histogram.equalize();
    histogram.apply(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PixelBuffer {
        let mut buf = PixelBuffer::new(3, 2, 4).unwrap();
        buf.set(0, 0, Color::rgba(0, 64, 255, 10)).unwrap();
        buf.set(1, 0, Color::rgba(128, 128, 128, 255)).unwrap();
        buf.set(2, 1, Color::rgba(250, 5, 77, 0)).unwrap();
        buf
    }

    #[test]
    fn test_negative_preserves_alpha() {
        let out = negative(&sample());
        assert_eq!(out.get(0, 0).unwrap(), Color::rgba(255, 191, 0, 10));
        assert_eq!(negative(&out), sample());
    }

    #[test]
    fn test_contrast_minimum_rounds_to_mid_gray() {
        let out = contrast(&sample(), -100.0);
        assert_eq!(out.get(0, 0).unwrap(), Color::rgba(128, 128, 128, 10));
        assert_eq!(out.get(2, 1).unwrap(), Color::rgba(128, 128, 128, 0));
    }

    #[test]
    fn test_threshold_binary() {
        let out = threshold(&sample(), 0.5);
        assert_eq!(out.get(1, 0).unwrap(), Color::WHITE);
        assert_eq!(out.get(0, 1).unwrap(), Color::BLACK);
        // 332 / 755 < 0.5
        assert_eq!(out.get(2, 1).unwrap(), Color::rgba(0, 0, 0, 0));
    }

    #[test]
    fn test_gamma_ramp_endpoints() {
        for g in [0.2f32, 0.5, 1.0, 2.2, 5.0] {
            let ramp = gamma_ramp(g).unwrap();
            assert_eq!(ramp[0], 0);
            assert_eq!(ramp[255], 255);
        }
        assert_eq!(gamma_ramp(1.0).unwrap()[100], 100);
        assert!(gamma_ramp(2.0).unwrap()[64] > 64);
        assert!(gamma_ramp(0.0).is_err());
        assert!(gamma_ramp(f32::NAN).is_err());
    }

    #[test]
    fn test_colorize_requires_full_palette() {
        assert!(colorize(&sample(), &[Color::WHITE; 255]).is_err());
        let palette: Vec<Color> = (0..=255u8).map(|v| Color::rgb(0, v, 0)).collect();
        let out = colorize(&sample(), &palette).unwrap();
        assert_eq!(out.get(1, 0).unwrap(), Color::rgb(0, 128, 0));
    }

    #[test]
    fn test_stretch_contrast_spans_full_range() {
        let mut buf = PixelBuffer::filled(2, 1, 3, Color::rgb(50, 10, 9)).unwrap();
        buf.set(1, 0, Color::rgb(150, 20, 9)).unwrap();
        let out = stretch_contrast(&buf);
        assert_eq!(out.get(0, 0).unwrap(), Color::rgb(0, 0, 9));
        assert_eq!(out.get(1, 0).unwrap(), Color::rgb(255, 255, 9));
    }

    #[test]
    fn test_equalize_with_reference() {
        let reference = PixelBuffer::filled(2, 2, 3, Color::rgb(10, 10, 10)).unwrap();
        let target = PixelBuffer::filled(1, 1, 3, Color::rgb(10, 9, 200)).unwrap();
        let out = equalize_with(&reference, &target);
        assert_eq!(out.get(0, 0).unwrap(), Color::rgb(255, 0, 255));
    }

    #[test]
    fn test_grayscale_equal_channels() {
        let c = grayscale(&sample()).get(2, 1).unwrap();
        assert_eq!(c.r, c.g);
        assert_eq!(c.g, c.b);
    }
}
