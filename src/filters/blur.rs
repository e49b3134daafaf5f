//! Blur filters: Box, Gaussian approximation, Median, Kuwahara, SNN.
//!
//! Box and Gaussian go through [`ConvolutionFilter`]; the others compute
//! windowed statistics directly over a square aperture of side `size`
//! (covering `[-size/2, size/2]` around each pixel).
//!
//! ## Supported Formats
//!
//! - **RGB**: (height, width, 3)
//! - **RGBA**: (height, width, 4) - RGB processed, alpha preserved

use log::debug;

use super::convolution::ConvolutionFilter;
use super::core::{aperture_half, for_each_in_window};
use crate::buffer::{Color, PixelBuffer};
use crate::error::{ImagingError, Result};

// ============================================================================
// Box / Gaussian
// ============================================================================

/// Uniform-weight square blur.
///
/// # Arguments
/// * `source` - Image to blur
/// * `size` - Odd aperture size; 1 leaves the image unchanged
///
/// # Returns
/// Blurred image with same channel count
pub fn box_blur(source: &PixelBuffer, size: usize) -> Result<PixelBuffer> {
    if size % 2 == 0 {
        return Err(ImagingError::invalid(format!(
            "box blur size must be odd, got {}",
            size
        )));
    }
    Ok(ConvolutionFilter::uniform(size)?.apply(source))
}

/// Gaussian approximation: three sequential box blurs.
pub fn gaussian_blur(source: &PixelBuffer, size: usize) -> Result<PixelBuffer> {
    let first = box_blur(source, size)?;
    let second = box_blur(&first, size)?;
    box_blur(&second, size)
}

// ============================================================================
// Median
// ============================================================================

/// Per-channel median over the aperture.
///
/// Removes salt-and-pepper noise while preserving edges. Only in-bounds
/// pixels take part near the border.
pub fn median(source: &PixelBuffer, size: usize) -> Result<PixelBuffer> {
    let half = aperture_half(size, "median")?;
    let mut output = source.with_alpha_of();
    let mut values: [Vec<u8>; 3] = Default::default();

    for y in 0..source.height() {
        for x in 0..source.width() {
            for channel in values.iter_mut() {
                channel.clear();
            }
            for_each_in_window(source, x, y, half, |_, _, c| {
                values[0].push(c.r);
                values[1].push(c.g);
                values[2].push(c.b);
            });
            let mut mid = [0u8; 3];
            for (slot, channel) in mid.iter_mut().zip(values.iter_mut()) {
                channel.sort_unstable();
                *slot = channel[channel.len() / 2];
            }
            output.put_rgb(x, y, mid[0], mid[1], mid[2]);
        }
    }
    Ok(output)
}

// ============================================================================
// Kuwahara
// ============================================================================

/// Kuwahara filter.
///
/// The aperture is split into four overlapping quadrants that share the
/// center row and column. The output is the mean of the quadrant with the
/// smallest summed R+G+B range; earlier quadrants win ties.
pub fn kuwahara(source: &PixelBuffer, size: usize) -> Result<PixelBuffer> {
    let half = aperture_half(size, "kuwahara")?;
    let (width, height) = (source.width() as isize, source.height() as isize);
    // (min_dx, max_dx, min_dy, max_dy), inclusive
    let quadrants = [
        (-half, 0, -half, 0),
        (0, half, -half, 0),
        (-half, 0, 0, half),
        (0, half, 0, half),
    ];
    debug!("kuwahara blur, size {}", size);

    let mut output = source.with_alpha_of();
    for y in 0..height {
        for x in 0..width {
            let mut best: Option<(i32, [u32; 3], u32)> = None;

            for &(min_dx, max_dx, min_dy, max_dy) in &quadrants {
                let mut sums = [0u32; 3];
                let mut lo = [255u8; 3];
                let mut hi = [0u8; 3];
                let mut count = 0u32;

                for dy in min_dy..=max_dy {
                    let sy = y + dy;
                    if sy < 0 || sy >= height {
                        continue;
                    }
                    for dx in min_dx..=max_dx {
                        let sx = x + dx;
                        if sx < 0 || sx >= width {
                            continue;
                        }
                        let c = source.pixel(sx as usize, sy as usize);
                        for (i, v) in [c.r, c.g, c.b].into_iter().enumerate() {
                            sums[i] += v as u32;
                            lo[i] = lo[i].min(v);
                            hi[i] = hi[i].max(v);
                        }
                        count += 1;
                    }
                }

                if count == 0 {
                    continue;
                }
                let range: i32 = (0..3).map(|i| hi[i] as i32 - lo[i] as i32).sum();
                if best.map_or(true, |(r, _, _)| range < r) {
                    best = Some((range, sums, count));
                }
            }

            // The quadrant containing the center pixel is never empty.
            if let Some((_, sums, count)) = best {
                output.put_rgb(
                    x as usize,
                    y as usize,
                    (sums[0] / count) as u8,
                    (sums[1] / count) as u8,
                    (sums[2] / count) as u8,
                );
            }
        }
    }
    Ok(output)
}

// ============================================================================
// Symmetric Nearest Neighbor
// ============================================================================

/// Symmetric nearest neighbor blur.
///
/// For every offset in the aperture whose mirrored pair is fully in bounds,
/// the member of the pair closer in color to the center pixel is averaged.
pub fn snn(source: &PixelBuffer, size: usize) -> Result<PixelBuffer> {
    let half = aperture_half(size, "snn")?;
    let (width, height) = (source.width() as isize, source.height() as isize);
    let inside = |x: isize, y: isize| x >= 0 && x < width && y >= 0 && y < height;

    let mut output = source.with_alpha_of();
    for y in 0..height {
        for x in 0..width {
            let center = source.pixel(x as usize, y as usize);
            let mut sums = [0u32; 3];
            let mut count = 0u32;

            for dy in -half..=half {
                for dx in -half..=half {
                    let (x1, y1, x2, y2) = (x + dx, y + dy, x - dx, y - dy);
                    if !inside(x1, y1) || !inside(x2, y2) {
                        continue;
                    }
                    let a = source.pixel(x1 as usize, y1 as usize);
                    let b = source.pixel(x2 as usize, y2 as usize);
                    let chosen = closer(&center, a, b);
                    sums[0] += chosen.r as u32;
                    sums[1] += chosen.g as u32;
                    sums[2] += chosen.b as u32;
                    count += 1;
                }
            }

            // (0, 0) always pairs with itself, so count >= 1.
            output.put_rgb(
                x as usize,
                y as usize,
                (sums[0] / count) as u8,
                (sums[1] / count) as u8,
                (sums[2] / count) as u8,
            );
        }
    }
    Ok(output)
}

#[inline]
fn closer(center: &Color, a: Color, b: Color) -> Color {
    if center.distance(&a) < center.distance(&b) {
        a
    } else {
        b
    }
}
