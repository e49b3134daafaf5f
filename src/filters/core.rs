//! Core utilities shared by the filters.
//!
//! - Square aperture bounds for window filters
//! - Luminance height lookup used by erosion and turbulence
//! - Color blending for compositing

use crate::buffer::{Color, PixelBuffer};
use crate::error::{ImagingError, Result};

/// Validate an aperture size and return its half-width.
///
/// Window filters cover `[-half, half]` around each pixel.
pub(crate) fn aperture_half(size: usize, what: &str) -> Result<isize> {
    if size == 0 {
        return Err(ImagingError::invalid(format!(
            "{} aperture size must be at least 1",
            what
        )));
    }
    Ok((size / 2) as isize)
}

/// Visit every in-bounds pixel of the square window centred on `(x, y)`.
#[inline]
pub(crate) fn for_each_in_window<F>(buffer: &PixelBuffer, x: usize, y: usize, half: isize, mut f: F)
where
    F: FnMut(usize, usize, Color),
{
    let (width, height) = (buffer.width() as isize, buffer.height() as isize);
    for dy in -half..=half {
        let sy = y as isize + dy;
        if sy < 0 || sy >= height {
            continue;
        }
        for dx in -half..=half {
            let sx = x as isize + dx;
            if sx < 0 || sx >= width {
                continue;
            }
            f(sx as usize, sy as usize, buffer.pixel(sx as usize, sy as usize));
        }
    }
}

/// Height of a pixel as its red channel scaled to 0.0-1.0.
#[inline]
pub(crate) fn height_of(color: Color) -> f32 {
    color.r as f32 / 255.0
}

/// Blend a color onto an existing pixel using alpha.
///
/// Uses Porter-Duff "over" compositing.
#[inline]
pub(crate) fn blend_over_u8(dst: &mut [u8; 4], src_r: u8, src_g: u8, src_b: u8, src_a: u8) {
    if src_a == 0 {
        return;
    }
    if src_a == 255 {
        dst[0] = src_r;
        dst[1] = src_g;
        dst[2] = src_b;
        dst[3] = 255;
        return;
    }

    let src_af = src_a as f32 / 255.0;
    let dst_af = dst[3] as f32 / 255.0;
    let out_a = src_af + dst_af * (1.0 - src_af);

    if out_a > 0.0 {
        let mix = |s: u8, d: u8| -> u8 {
            ((s as f32 * src_af + d as f32 * dst_af * (1.0 - src_af)) / out_a)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        dst[0] = mix(src_r, dst[0]);
        dst[1] = mix(src_g, dst[1]);
        dst[2] = mix(src_b, dst[2]);
        dst[3] = (out_a * 255.0).round() as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aperture_half() {
        assert_eq!(aperture_half(1, "box").unwrap(), 0);
        assert_eq!(aperture_half(5, "box").unwrap(), 2);
        assert!(aperture_half(0, "box").is_err());
    }

    #[test]
    fn test_window_clips_at_corner() {
        let buf = PixelBuffer::new(4, 4, 3).unwrap();
        let mut count = 0;
        for_each_in_window(&buf, 0, 0, 1, |_, _, _| count += 1);
        assert_eq!(count, 4);
    }

    #[test]
    fn test_blend_half_alpha() {
        let mut dst = [0u8, 0, 0, 255];
        blend_over_u8(&mut dst, 200, 100, 50, 128);
        assert!((dst[0] as i32 - 100).abs() <= 1);
        assert!((dst[1] as i32 - 50).abs() <= 1);
        assert_eq!(dst[3], 255);
    }

    #[test]
    fn test_blend_transparent_source_is_noop() {
        let mut dst = [10u8, 20, 30, 255];
        blend_over_u8(&mut dst, 200, 100, 50, 0);
        assert_eq!(dst, [10, 20, 30, 255]);
    }
}
