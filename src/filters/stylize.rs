//! Stylize filters: Pixelate, Sine Wave, Turbulence.
//!
//! ## Supported Formats
//!
//! - **RGB**: (height, width, 3)
//! - **RGBA**: (height, width, 4)

use log::debug;

use super::core::height_of;
use crate::buffer::PixelBuffer;
use crate::error::{ImagingError, Result};
use crate::perlin::PerlinNoise;

// ============================================================================
// Pixelate
// ============================================================================

/// Block-average mosaic.
///
/// Block centers advance by `pixel_size / 2` on both axes. Each block spans
/// `[center - pixel_size / 2, center + pixel_size / 2)` clipped to the image
/// and is filled with its channel sums divided by `pixel_size²`. Later blocks
/// overwrite earlier ones where they overlap.
///
/// # Arguments
/// * `source` - Image to pixelate
/// * `pixel_size` - Block size, at least 2
pub fn pixelate(source: &PixelBuffer, pixel_size: usize) -> Result<PixelBuffer> {
    if pixel_size < 2 {
        return Err(ImagingError::invalid(format!(
            "pixelate block size must be at least 2, got {}",
            pixel_size
        )));
    }
    let (width, height) = source.dimensions();
    let half = pixel_size / 2;
    // NOTE: the stride is half a block while the divisor is a full block, so
    // interior blocks average only a quarter of the expected area and come out
    // darker. Probably a defect, kept for output compatibility.
    let divisor = (pixel_size as u64).saturating_mul(pixel_size as u64);
    let mut output = source.with_alpha_of();

    for x in (0..width).step_by(half) {
        let (min_x, max_x) = (x.saturating_sub(half), x.saturating_add(half).min(width));
        for y in (0..height).step_by(half) {
            let (min_y, max_y) = (y.saturating_sub(half), y.saturating_add(half).min(height));

            let mut sums = [0u64; 3];
            for sx in min_x..max_x {
                for sy in min_y..max_y {
                    let c = source.pixel(sx, sy);
                    sums[0] += c.r as u64;
                    sums[1] += c.g as u64;
                    sums[2] += c.b as u64;
                }
            }
            let mean = sums.map(|s| (s / divisor).min(255) as u8);
            for sx in min_x..max_x {
                for sy in min_y..max_y {
                    output.put_rgb(sx, sy, mean[0], mean[1], mean[2]);
                }
            }
        }
    }
    Ok(output)
}

// ============================================================================
// Sine Wave
// ============================================================================

/// Sinusoidal displacement with wraparound.
///
/// With `y_direction`, rows shift by `sin(x * frequency°) * amplitude`; with
/// `x_direction`, columns shift by `sin(y * frequency°) * amplitude`.
/// Displacements are truncated to whole pixels.
///
/// # Arguments
/// * `amplitude` - Peak displacement in pixels
/// * `frequency` - Degrees of phase per pixel
pub fn sin_wave(
    source: &PixelBuffer,
    amplitude: f32,
    frequency: f32,
    x_direction: bool,
    y_direction: bool,
) -> PixelBuffer {
    let (width, height) = (source.width() as i64, source.height() as i64);
    // Displacement is reduced modulo the axis length; saturated casts from
    // non-finite parameters stay in range.
    let wave = |t: i64, len: i64| -> i64 {
        (((t as f64 * frequency as f64).to_radians().sin() * amplitude as f64) as i64).rem_euclid(len)
    };
    let mut output = source.blank_like();

    for y in 0..height {
        for x in 0..width {
            let dy = if y_direction { wave(x, height) } else { 0 };
            let dx = if x_direction { wave(y, width) } else { 0 };
            let sx = (x - dx).rem_euclid(width);
            let sy = (y - dy).rem_euclid(height);
            output.put(x as usize, y as usize, source.pixel(sx as usize, sy as usize));
        }
    }
    output
}

// ============================================================================
// Turbulence
// ============================================================================

/// Displace pixels by two Perlin noise fields.
///
/// Each output pixel samples the source at
/// `(x + noise_x * power, y + noise_y * power)` (noise in 0.0-1.0, truncated
/// and clamped to the image). The Y field uses twice the X seed, or 1 when
/// the seed is 0.
///
/// # Arguments
/// * `roughness` - Noise octave count
/// * `power` - Maximum displacement in pixels
/// * `seed` - Seed of the X displacement field
pub fn turbulence(source: &PixelBuffer, roughness: u32, power: f32, seed: u64) -> Result<PixelBuffer> {
    let (width, height) = source.dimensions();
    debug!(
        "turbulence on {}x{}: roughness {}, power {}, seed {}",
        width, height, roughness, power, seed
    );
    let field = |seed: u64| {
        PerlinNoise {
            octaves: roughness,
            seed,
            ..Default::default()
        }
        .generate(width, height)
    };
    let x_noise = field(seed)?;
    let y_noise = field(if seed == 0 { 1 } else { seed.wrapping_mul(2) })?;

    let mut output = source.blank_like();
    for y in 0..height {
        for x in 0..width {
            let dx = x as f32 + height_of(x_noise.pixel(x, y)) * power;
            let dy = y as f32 + height_of(y_noise.pixel(x, y)) * power;
            let sx = (dx as i64).clamp(0, width as i64 - 1) as usize;
            let sy = (dy as i64).clamp(0, height as i64 - 1) as usize;
            output.put(x, y, source.pixel(sx, sy));
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Color;

    fn solid(width: usize, height: usize, color: Color) -> PixelBuffer {
        PixelBuffer::filled(width, height, 3, color).unwrap()
    }

    #[test]
    fn test_pixelate_rejects_small_blocks() {
        assert!(pixelate(&solid(4, 4, Color::WHITE), 1).is_err());
        assert!(pixelate(&solid(4, 4, Color::WHITE), 0).is_err());
    }

    #[test]
    fn test_pixelate_quarter_area_average() {
        // 8x8 of 200: the last block at (6, 6) spans [4, 8) x [4, 8), 16 pixels / 16
        let out = pixelate(&solid(8, 8, Color::rgb(200, 200, 200)), 4).unwrap();
        assert_eq!(out.get(7, 7).unwrap(), Color::rgb(200, 200, 200));

        // Edge block at (0, 0) spans [0, 2) x [0, 2) but is overwritten by
        // the block at (2, 2), which spans [0, 4) x [0, 4).
        assert_eq!(out.get(0, 0).unwrap(), Color::rgb(200, 200, 200));
    }

    #[test]
    fn test_pixelate_divisor_darkens_clipped_block() {
        // 3x3 image, block 4: stride 2, last block at (2, 2) spans [0, 3) x [0, 3)
        let out = pixelate(&solid(3, 3, Color::rgb(160, 160, 160)), 4).unwrap();
        // 9 * 160 / 16 = 90
        assert_eq!(out.get(1, 1).unwrap(), Color::rgb(90, 90, 90));
    }

    #[test]
    fn test_pixelate_huge_block_darkens_to_black() {
        let img = solid(4, 4, Color::rgb(200, 200, 200));
        for pixel_size in [65536, usize::MAX] {
            let out = pixelate(&img, pixel_size).unwrap();
            assert_eq!(out.dimensions(), (4, 4));
            assert_eq!(out.get(3, 3).unwrap(), Color::BLACK);
        }
    }

    #[test]
    fn test_sin_wave_non_finite_parameters() {
        let mut img = solid(5, 4, Color::BLACK);
        img.set(2, 1, Color::WHITE).unwrap();
        for (amplitude, frequency) in [
            (f32::INFINITY, 45.0),
            (f32::NEG_INFINITY, 45.0),
            (f32::NAN, 45.0),
            (3.0, f32::INFINITY),
        ] {
            let out = sin_wave(&img, amplitude, frequency, true, true);
            assert_eq!(out.dimensions(), (5, 4));
        }
    }

    #[test]
    fn test_sin_wave_zero_amplitude_is_identity() {
        let mut img = solid(5, 4, Color::BLACK);
        img.set(1, 2, Color::WHITE).unwrap();
        assert_eq!(sin_wave(&img, 0.0, 30.0, true, true), img);
        assert_eq!(sin_wave(&img, 10.0, 30.0, false, false), img);
    }

    #[test]
    fn test_sin_wave_wraps() {
        let mut img = solid(4, 4, Color::BLACK);
        img.set(0, 0, Color::WHITE).unwrap();
        // Column x = 1: sin(90°) * 1 = 1, samples row y - 1 wrapped.
        let out = sin_wave(&img, 1.0, 90.0, false, true);
        assert_eq!(out.get(1, 1).unwrap(), Color::BLACK);
        assert_eq!(out.get(0, 0).unwrap(), Color::WHITE);
        let mut shifted = solid(4, 4, Color::BLACK);
        shifted.set(1, 0, Color::WHITE).unwrap();
        let out = sin_wave(&shifted, 1.0, 90.0, false, true);
        assert_eq!(out.get(1, 1).unwrap(), Color::WHITE);
    }

    #[test]
    fn test_turbulence_zero_power_is_identity() {
        let mut img = solid(6, 6, Color::BLACK);
        img.set(3, 3, Color::WHITE).unwrap();
        assert_eq!(turbulence(&img, 2, 0.0, 4).unwrap(), img);
    }

    #[test]
    fn test_turbulence_deterministic() {
        let mut img = solid(12, 12, Color::BLACK);
        for i in 0..12 {
            img.set(i, i, Color::WHITE).unwrap();
        }
        let a = turbulence(&img, 3, 4.0, 9).unwrap();
        let b = turbulence(&img, 3, 4.0, 9).unwrap();
        assert_eq!(a, b);
    }
}
