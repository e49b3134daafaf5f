//! 5x5 affine color transform.
//!
//! Rows correspond to the input components `R, G, B, A, 1` and columns to the
//! output components. Each output channel is
//! `out[j] = sum_i in[i] * m[i][j]` over normalized (0.0-1.0) inputs, then
//! scaled back to 0-255 with rounding and clamping. The last column is unused
//! and the translation row must end in 1.

use crate::buffer::{clamp_channel_f32, Color, PixelBuffer};
use crate::error::{ImagingError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix {
    m: [[f32; 5]; 5],
}

impl Default for ColorMatrix {
    fn default() -> Self {
        ColorMatrix::identity()
    }
}

impl ColorMatrix {
    /// Build from raw rows. The translation row's last element must be 1.
    pub fn new(m: [[f32; 5]; 5]) -> Result<Self> {
        if m[4][4] != 1.0 {
            return Err(ImagingError::invalid(format!(
                "color matrix translation row must end in 1, got {}",
                m[4][4]
            )));
        }
        Ok(ColorMatrix { m })
    }

    pub const fn identity() -> Self {
        ColorMatrix {
            m: [
                [1.0, 0.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn rows(&self) -> &[[f32; 5]; 5] {
        &self.m
    }

    /// Identity plus a constant offset of `value / 255` on R, G and B.
    ///
    /// # Arguments
    /// * `value` - Offset in 8-bit units, typically -255..=255
    pub fn brightness(value: i32) -> Self {
        let t = value as f32 / 255.0;
        let mut matrix = ColorMatrix::identity();
        matrix.m[4][0] = t;
        matrix.m[4][1] = t;
        matrix.m[4][2] = t;
        matrix
    }

    /// Scale R, G and B around the 0.5 midpoint by `((100 + value) / 100)²`.
    ///
    /// # Arguments
    /// * `value` - Contrast amount, -100 (flat gray) to 100
    pub fn contrast(value: f32) -> Self {
        let factor = ((100.0 + value) / 100.0).powi(2);
        let t = 0.5 * (1.0 - factor);
        let mut matrix = ColorMatrix::identity();
        for c in 0..3 {
            matrix.m[c][c] = factor;
            matrix.m[4][c] = t;
        }
        matrix
    }

    /// Keep only the red channel.
    pub fn red_filter() -> Self {
        ColorMatrix::isolate(0)
    }

    /// Keep only the green channel.
    pub fn green_filter() -> Self {
        ColorMatrix::isolate(1)
    }

    /// Keep only the blue channel.
    pub fn blue_filter() -> Self {
        ColorMatrix::isolate(2)
    }

    /// Luminance weights `.3, .59, .11` replicated across R, G and B.
    pub fn grayscale() -> Self {
        ColorMatrix {
            m: [
                [0.3, 0.3, 0.3, 0.0, 0.0],
                [0.59, 0.59, 0.59, 0.0, 0.0],
                [0.11, 0.11, 0.11, 0.0, 0.0],
                [0.0, 0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn sepia() -> Self {
        ColorMatrix {
            m: [
                [0.393, 0.349, 0.272, 0.0, 0.0],
                [0.769, 0.686, 0.534, 0.0, 0.0],
                [0.189, 0.168, 0.131, 0.0, 0.0],
                [0.0, 0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Identity with alpha scaled by `opacity` (0.0-1.0).
    pub fn opacity(opacity: f32) -> Self {
        let mut matrix = ColorMatrix::identity();
        matrix.m[3][3] = opacity;
        matrix
    }

    fn isolate(channel: usize) -> Self {
        let mut matrix = ColorMatrix::identity();
        for c in 0..3 {
            if c != channel {
                matrix.m[c][c] = 0.0;
            }
        }
        matrix
    }

    /// Transform a single color, alpha included.
    ///
    /// Results are rounded to nearest before clamping.
    pub fn transform(&self, color: Color) -> Color {
        let input = [
            color.r as f32 / 255.0,
            color.g as f32 / 255.0,
            color.b as f32 / 255.0,
            color.a as f32 / 255.0,
            1.0,
        ];
        let mut out = [0u8; 4];
        for (j, slot) in out.iter_mut().enumerate() {
            let v: f32 = (0..5).map(|i| input[i] * self.m[i][j]).sum();
            *slot = clamp_channel_f32(v * 255.0);
        }
        Color::rgba(out[0], out[1], out[2], out[3])
    }

    /// Apply to every pixel of `source`.
    ///
    /// RGB buffers are treated as fully opaque and keep no alpha output.
    pub fn apply(&self, source: &PixelBuffer) -> PixelBuffer {
        let mut output = source.blank_like();
        for y in 0..source.height() {
            for x in 0..source.width() {
                output.put(x, y, self.transform(source.pixel(x, y)));
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_noop() {
        let c = Color::rgba(12, 130, 250, 90);
        assert_eq!(ColorMatrix::identity().transform(c), c);
    }

    #[test]
    fn test_rejects_bad_translation_row() {
        let mut m = *ColorMatrix::identity().rows();
        m[4][4] = 0.5;
        assert!(ColorMatrix::new(m).is_err());
        m[4][4] = 1.0;
        assert!(ColorMatrix::new(m).is_ok());
    }

    #[test]
    fn test_brightness_offsets_and_clamps() {
        let out = ColorMatrix::brightness(50).transform(Color::rgb(10, 100, 230));
        assert_eq!(out, Color::rgb(60, 150, 255));
        let out = ColorMatrix::brightness(-50).transform(Color::rgb(10, 100, 230));
        assert_eq!(out, Color::rgb(0, 50, 180));
    }

    #[test]
    fn test_contrast_keeps_midpoint() {
        let mid = ColorMatrix::contrast(50.0).transform(Color::rgb(128, 128, 128));
        assert!((mid.r as i32 - 128).abs() <= 1);
        let flat = ColorMatrix::contrast(-100.0).transform(Color::rgb(0, 255, 40));
        assert_eq!(flat, Color::rgb(128, 128, 128));
    }

    #[test]
    fn test_channel_isolation() {
        let c = Color::rgb(10, 20, 30);
        assert_eq!(ColorMatrix::red_filter().transform(c), Color::rgb(10, 0, 0));
        assert_eq!(ColorMatrix::green_filter().transform(c), Color::rgb(0, 20, 0));
        assert_eq!(ColorMatrix::blue_filter().transform(c), Color::rgb(0, 0, 30));
    }

    #[test]
    fn test_grayscale_weights() {
        let out = ColorMatrix::grayscale().transform(Color::rgb(100, 100, 100));
        assert_eq!(out, Color::rgb(100, 100, 100));
        let out = ColorMatrix::grayscale().transform(Color::rgb(255, 0, 0));
        assert_eq!(out.r, out.g);
        assert_eq!(out.g, out.b);
        assert!((76..=77).contains(&out.r));
    }

    #[test]
    fn test_sepia_white_saturates() {
        let out = ColorMatrix::sepia().transform(Color::WHITE);
        assert_eq!(out.r, 255);
        assert_eq!(out.g, 255);
        assert_eq!(out.b, 239);
    }

    #[test]
    fn test_opacity_scales_alpha_only() {
        let out = ColorMatrix::opacity(0.5).transform(Color::rgba(40, 50, 60, 200));
        assert_eq!(out, Color::rgba(40, 50, 60, 100));
    }

    #[test]
    fn test_apply_rgb_buffer() {
        let src = PixelBuffer::filled(2, 2, 3, Color::rgb(200, 10, 10)).unwrap();
        let out = ColorMatrix::red_filter().apply(&src);
        assert_eq!(out.get(1, 1).unwrap(), Color::rgb(200, 0, 0));
        assert_eq!(out.channels(), 3);
    }
}
