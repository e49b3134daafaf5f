//! Randomized filters: Add Noise, Jitter.
//!
//! Both take an explicit seed. The same seed, parameters and input always
//! reproduce the same output.
//!
//! ## Supported Formats
//!
//! - **RGB**: (height, width, 3) - processes all 3 channels
//! - **RGBA**: (height, width, 4) - processes RGB, preserves alpha

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::buffer::{clamp_channel, PixelBuffer};

// ============================================================================
// Add Noise
// ============================================================================

/// Add uniform noise to an image.
///
/// Every color channel is offset by an independent integer drawn from
/// `[-amount, amount]`, then clamped.
///
/// # Arguments
/// * `source` - Image to perturb
/// * `amount` - Maximum offset per channel
/// * `seed` - Random seed for deterministic results
///
/// # Returns
/// Noisy image with same channel count
pub fn add_noise(source: &PixelBuffer, amount: u8, seed: u64) -> PixelBuffer {
    let mut rng = StdRng::seed_from_u64(seed);
    let amount = amount as i32;
    let mut output = source.with_alpha_of();

    for y in 0..source.height() {
        for x in 0..source.width() {
            let c = source.pixel(x, y);
            let mut offset = || rng.gen_range(-amount..=amount);
            let r = clamp_channel(c.r as i32 + offset());
            let g = clamp_channel(c.g as i32 + offset());
            let b = clamp_channel(c.b as i32 + offset());
            output.put_rgb(x, y, r, g, b);
        }
    }
    output
}

// ============================================================================
// Jitter
// ============================================================================

/// Scatter pixels by sampling each output from a random nearby source.
///
/// The source offset on each axis is drawn from `[-max_jitter, max_jitter)`
/// and the sampled coordinate is clamped to the image. `max_jitter` is
/// capped at the longer image side.
pub fn jitter(source: &PixelBuffer, max_jitter: usize, seed: u64) -> PixelBuffer {
    if max_jitter == 0 {
        return source.clone();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let max = max_jitter.min(source.width().max(source.height())) as isize;
    let (width, height) = (source.width() as isize, source.height() as isize);
    let mut output = source.blank_like();

    for y in 0..height {
        for x in 0..width {
            let sx = (x + rng.gen_range(-max..max)).clamp(0, width - 1);
            let sy = (y + rng.gen_range(-max..max)).clamp(0, height - 1);
            output.put(x as usize, y as usize, source.pixel(sx as usize, sy as usize));
        }
    }
    output
}
