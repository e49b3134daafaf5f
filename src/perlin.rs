//! Seedable multi-octave value noise.
//!
//! A grid of uniform random values in [-1, 1] (one per pixel, from a seeded
//! generator) is sampled with bilinear smoothing at geometrically increasing
//! frequencies. Octave `i` is sampled at `frequency * 2^i` and weighted by
//! `amplitude * persistence^i`. The sum is clamped to [-1, 1], mapped to
//! 0-255 and clamped to `[min_value, max_value]`.
//!
//! Generation is deterministic: identical parameters give identical output.

use log::debug;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::buffer::{Color, PixelBuffer};
use crate::error::{ImagingError, Result};

/// Noise field parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PerlinNoise {
    /// Upper bound of the output intensity.
    pub max_value: u8,
    /// Lower bound of the output intensity.
    pub min_value: u8,
    /// Base frequency in cycles per pixel.
    pub frequency: f32,
    /// Weight of the first octave.
    pub amplitude: f32,
    /// Weight multiplier applied per octave.
    pub persistence: f32,
    pub octaves: u32,
    pub seed: u64,
}

impl Default for PerlinNoise {
    fn default() -> Self {
        PerlinNoise {
            max_value: 255,
            min_value: 0,
            frequency: 0.0625,
            amplitude: 1.0,
            persistence: 0.5,
            octaves: 4,
            seed: 0,
        }
    }
}

impl PerlinNoise {
    /// Render the noise field as a 3-channel grayscale buffer.
    pub fn generate(&self, width: usize, height: usize) -> Result<PixelBuffer> {
        if self.min_value > self.max_value {
            return Err(ImagingError::invalid(format!(
                "noise range is empty: min {} > max {}",
                self.min_value, self.max_value
            )));
        }
        let mut output = PixelBuffer::new(width, height, 3)?;
        debug!(
            "generating {}x{} noise: {} octaves, frequency {}, persistence {}, seed {}",
            width, height, self.octaves, self.frequency, self.persistence, self.seed
        );

        let grid = noise_grid(width, height, self.seed);
        for y in 0..height {
            for x in 0..width {
                let value = self.value_at(x as f32, y as f32, &grid);
                let level = ((value * 0.5 + 0.5) * 255.0) as i32;
                let level = level.clamp(self.min_value as i32, self.max_value as i32) as u8;
                output.put(x, y, Color::rgb(level, level, level));
            }
        }
        Ok(output)
    }

    /// Octave sum at `(x, y)`, clamped to [-1, 1].
    fn value_at(&self, x: f32, y: f32, grid: &Array2<f32>) -> f32 {
        let mut frequency = self.frequency;
        let mut amplitude = self.amplitude;
        let mut total = 0.0f32;
        for _ in 0..self.octaves {
            total += smooth_noise(x * frequency, y * frequency, grid) * amplitude;
            frequency *= 2.0;
            amplitude *= self.persistence;
        }
        total.clamp(-1.0, 1.0)
    }
}

/// Generate a noise image.
///
/// # Arguments
/// * `width`, `height` - Output size, both positive
/// * `max_value` - Upper intensity bound
/// * `min_value` - Lower intensity bound
/// * `frequency` - Initial frequency
/// * `amplitude` - Initial octave weight
/// * `persistence` - Per-octave weight multiplier
/// * `octaves` - Number of layers
/// * `seed` - Random seed
#[allow(clippy::too_many_arguments)]
pub fn generate(
    width: usize,
    height: usize,
    max_value: u8,
    min_value: u8,
    frequency: f32,
    amplitude: f32,
    persistence: f32,
    octaves: u32,
    seed: u64,
) -> Result<PixelBuffer> {
    PerlinNoise {
        max_value,
        min_value,
        frequency,
        amplitude,
        persistence,
        octaves,
        seed,
    }
    .generate(width, height)
}

/// One random value in [-1, 1) per pixel, indexed `[[x, y]]`.
fn noise_grid(width: usize, height: usize, seed: u64) -> Array2<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut grid = Array2::<f32>::zeros((width, height));
    for x in 0..width {
        for y in 0..height {
            grid[[x, y]] = (rng.gen::<f32>() - 0.5) * 2.0;
        }
    }
    grid
}

/// Bilinear blend of the grid cell at `(x, y)` and its wrapped lower neighbors.
fn smooth_noise(x: f32, y: f32, grid: &Array2<f32>) -> f32 {
    let (width, height) = grid.dim();
    let (w, h) = (width as i64, height as i64);
    let (xi, yi) = (x.floor() as i64, y.floor() as i64);
    let (fx, fy) = (x - xi as f32, y - yi as f32);

    let x1 = xi.rem_euclid(w) as usize;
    let y1 = yi.rem_euclid(h) as usize;
    let x2 = (xi - 1).rem_euclid(w) as usize;
    let y2 = (yi - 1).rem_euclid(h) as usize;

    fx * fy * grid[[x1, y1]]
        + fx * (1.0 - fy) * grid[[x1, y2]]
        + (1.0 - fx) * fy * grid[[x2, y1]]
        + (1.0 - fx) * (1.0 - fy) * grid[[x2, y2]]
}
