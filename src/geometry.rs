//! Geometric transforms: crop, resize, rotate, flip.
//!
//! Every transform returns a newly allocated buffer with the source's channel
//! count. Resampling maps pixel centers, so `(x + 0.5)` in the output lands
//! on `(x + 0.5) * src / dst` in the source.

use log::debug;
use ndarray::{Array3, Axis};
use rayon::prelude::*;

use crate::buffer::{clamp_channel_f32, PixelBuffer};
use crate::error::{ImagingError, Result};

/// Vertical anchor of a crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAlign {
    Top,
    Bottom,
}

/// Horizontal anchor of a crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAlign {
    Left,
    Right,
}

/// Resampling quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    /// Catmull-Rom bicubic.
    #[default]
    High,
    /// Nearest neighbor.
    Low,
}

// ============================================================================
// Crop
// ============================================================================

/// Cut a `width` x `height` rectangle anchored at one corner of the source.
///
/// The rectangle is clamped to the source, so asking for more than the source
/// holds returns the whole source.
pub fn crop(
    source: &PixelBuffer,
    width: usize,
    height: usize,
    vertical: VerticalAlign,
    horizontal: HorizontalAlign,
) -> Result<PixelBuffer> {
    if width == 0 || height == 0 {
        return Err(ImagingError::invalid(format!(
            "crop size must be positive, got {}x{}",
            width, height
        )));
    }
    let (src_w, src_h) = source.dimensions();
    let (width, height) = (width.min(src_w), height.min(src_h));
    let left = match horizontal {
        HorizontalAlign::Left => 0,
        HorizontalAlign::Right => src_w - width,
    };
    let top = match vertical {
        VerticalAlign::Top => 0,
        VerticalAlign::Bottom => src_h - height,
    };

    let view = source.view();
    let region = view.slice(ndarray::s![top..top + height, left..left + width, ..]);
    PixelBuffer::from_array(region.to_owned())
}

// ============================================================================
// Resize
// ============================================================================

/// Scale uniformly so the longer side equals `max_side`.
///
/// The shorter side is rounded and never drops below 1.
pub fn resize_to_max_side(source: &PixelBuffer, max_side: usize) -> Result<PixelBuffer> {
    if max_side == 0 {
        return Err(ImagingError::invalid("max side must be positive"));
    }
    let (w, h) = source.dimensions();
    let coefficient = max_side as f64 / w.max(h) as f64;
    let new_w = ((w as f64 * coefficient).round() as usize).max(1);
    let new_h = ((h as f64 * coefficient).round() as usize).max(1);
    resize(source, new_w, new_h, Quality::High)
}

/// Resample to exactly `width` x `height`.
pub fn resize(source: &PixelBuffer, width: usize, height: usize, quality: Quality) -> Result<PixelBuffer> {
    if width == 0 || height == 0 {
        return Err(ImagingError::invalid(format!(
            "resize target must be positive, got {}x{}",
            width, height
        )));
    }
    let (src_w, src_h) = source.dimensions();
    debug!(
        "resizing {}x{} -> {}x{} ({:?})",
        src_w, src_h, width, height, quality
    );
    if (src_w, src_h) == (width, height) {
        return Ok(source.clone());
    }

    let channels = source.channels();
    let input = source.view();
    let scale_x = src_w as f32 / width as f32;
    let scale_y = src_h as f32 / height as f32;
    let mut output = Array3::<u8>::zeros((height, width, channels));

    output
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(y, mut row)| {
            let fy = (y as f32 + 0.5) * scale_y - 0.5;
            for x in 0..width {
                let fx = (x as f32 + 0.5) * scale_x - 0.5;
                match quality {
                    Quality::Low => {
                        let sx = (((x as f32 + 0.5) * scale_x) as usize).min(src_w - 1);
                        let sy = (((y as f32 + 0.5) * scale_y) as usize).min(src_h - 1);
                        for c in 0..channels {
                            row[[x, c]] = input[[sy, sx, c]];
                        }
                    }
                    Quality::High => {
                        let taps_x = cubic_taps(fx, src_w);
                        let taps_y = cubic_taps(fy, src_h);
                        for c in 0..channels {
                            let mut sum = 0.0f32;
                            for &(sy, wy) in &taps_y {
                                for &(sx, wx) in &taps_x {
                                    sum += input[[sy, sx, c]] as f32 * wx * wy;
                                }
                            }
                            row[[x, c]] = clamp_channel_f32(sum);
                        }
                    }
                }
            }
        });

    PixelBuffer::from_array(output)
}

/// Four Catmull-Rom taps around `t`, indices clamped to `[0, len)`.
fn cubic_taps(t: f32, len: usize) -> [(usize, f32); 4] {
    let base = t.floor();
    let frac = t - base;
    let weights = catmull_rom_weights(frac);
    let mut taps = [(0usize, 0.0f32); 4];
    for (i, tap) in taps.iter_mut().enumerate() {
        let idx = (base as isize + i as isize - 1).clamp(0, len as isize - 1) as usize;
        *tap = (idx, weights[i]);
    }
    taps
}

/// Catmull-Rom basis weights for the points at -1, 0, 1, 2 relative to `t`.
fn catmull_rom_weights(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        0.5 * (-t3 + 2.0 * t2 - t),
        0.5 * (3.0 * t3 - 5.0 * t2 + 2.0),
        0.5 * (-3.0 * t3 + 4.0 * t2 + t),
        0.5 * (t3 - t2),
    ]
}

// ============================================================================
// Rotate / Flip
// ============================================================================

/// Rotate about the canvas center, keeping the canvas size.
///
/// Positive angles turn clockwise on screen. Content leaving the canvas is
/// clipped; uncovered pixels are zero (transparent black for RGBA).
/// Sampling is bilinear.
pub fn rotate(source: &PixelBuffer, degrees: f32) -> PixelBuffer {
    let (width, height) = source.dimensions();
    let channels = source.channels();
    debug!("rotating {}x{} by {} degrees", width, height, degrees);

    let (sin, cos) = (degrees as f64).to_radians().sin_cos();
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
    let (max_x, max_y) = ((width - 1) as f64, (height - 1) as f64);
    const EPS: f64 = 1e-6;

    let input = source.view();
    let mut output = Array3::<u8>::zeros((height, width, channels));
    output
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(y, mut row)| {
            let dy = y as f64 + 0.5 - cy;
            for x in 0..width {
                let dx = x as f64 + 0.5 - cx;
                // Inverse mapping into source pixel-index space.
                let sx = cx + dx * cos + dy * sin - 0.5;
                let sy = cy - dx * sin + dy * cos - 0.5;
                if sx < -EPS || sy < -EPS || sx > max_x + EPS || sy > max_y + EPS {
                    continue;
                }
                let (sx, sy) = (sx.clamp(0.0, max_x), sy.clamp(0.0, max_y));
                let (x0, y0) = (sx.floor() as usize, sy.floor() as usize);
                let (x1, y1) = ((x0 + 1).min(width - 1), (y0 + 1).min(height - 1));
                let (fx, fy) = ((sx - x0 as f64) as f32, (sy - y0 as f64) as f32);
                for c in 0..channels {
                    let top = input[[y0, x0, c]] as f32 * (1.0 - fx) + input[[y0, x1, c]] as f32 * fx;
                    let bottom = input[[y1, x0, c]] as f32 * (1.0 - fx) + input[[y1, x1, c]] as f32 * fx;
                    row[[x, c]] = clamp_channel_f32(top * (1.0 - fy) + bottom * fy);
                }
            }
        });

    PixelBuffer::from_shaped(output)
}

/// Mirror horizontally (`flip_x`) and/or vertically (`flip_y`).
pub fn flip(source: &PixelBuffer, flip_x: bool, flip_y: bool) -> PixelBuffer {
    let mut view = source.view();
    if flip_x {
        view.invert_axis(Axis(1));
    }
    if flip_y {
        view.invert_axis(Axis(0));
    }
    PixelBuffer::from_shaped(view.as_standard_layout().into_owned())
}
