//! Height-field erosion: fluvial (water and sediment) and thermal (slope relaxation).
//!
//! Heights are derived from the luminance of each pixel (0.0-1.0). Both
//! simulations run a fixed number of full passes over the field with no
//! convergence check, then convert back to a grayscale image.

use log::debug;

use crate::buffer::PixelBuffer;
use crate::error::{ImagingError, Result};
use crate::filters::color_matrix::ColorMatrix;
use crate::filters::core::height_of;

/// The 8 neighbors as `(dx, dy)`, column-major from the top-left.
const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// A grid of heights, one per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    /// Height values (row-major).
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl HeightField {
    /// Creates a flat field.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![0.0; width * height],
            width,
            height,
        }
    }

    /// Luminance of every pixel, scaled to 0.0-1.0.
    pub fn from_buffer(source: &PixelBuffer) -> Self {
        let gray = ColorMatrix::grayscale();
        let (width, height) = source.dimensions();
        let mut field = HeightField::new(width, height);
        for y in 0..height {
            for x in 0..width {
                field.data[y * width + x] = height_of(gray.transform(source.pixel(x, y)));
            }
        }
        field
    }

    /// Gray image of the field, heights clamped to 0.0-1.0.
    ///
    /// Channel count and alpha follow `template`.
    pub fn to_buffer(&self, template: &PixelBuffer) -> Result<PixelBuffer> {
        if template.dimensions() != (self.width, self.height) {
            return Err(ImagingError::invalid("height field and template sizes differ"));
        }
        let mut output = template.with_alpha_of();
        for y in 0..self.height {
            for x in 0..self.width {
                let level = (self.get(x, y).clamp(0.0, 1.0) * 255.0) as u8;
                output.put_rgb(x, y, level, level, level);
            }
        }
        Ok(output)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Gets the height at grid coordinates, 0.0 outside the field.
    pub fn get(&self, x: usize, y: usize) -> f32 {
        if x < self.width && y < self.height {
            self.data[y * self.width + x]
        } else {
            0.0
        }
    }

    /// Sets the height at grid coordinates; ignored outside the field.
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// In-field neighbors of `(x, y)` in [`NEIGHBORS`] order.
    fn neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        NEIGHBORS.iter().filter_map(move |&(dx, dy)| {
            let nx = x as isize + dx;
            let ny = y as isize + dy;
            (nx >= 0 && ny >= 0 && (nx as usize) < self.width && (ny as usize) < self.height)
                .then_some((nx as usize, ny as usize))
        })
    }
}

// ============================================================================
// Fluvial erosion
// ============================================================================

/// Water poured at one cell, carrying sediment downhill.
#[derive(Debug, Clone, PartialEq)]
pub struct FluvialErosion {
    /// Column of the water source.
    pub x: usize,
    /// Row of the water source.
    pub y: usize,
    /// Initial water at the source.
    pub water: f32,
    /// Fraction of carried sediment dropped per step.
    pub deposit_rate: f32,
    /// Sediment picked up per unit of water.
    pub pickup_rate: f32,
    pub iterations: usize,
}

impl Default for FluvialErosion {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            water: 0.5,
            deposit_rate: 0.1,
            pickup_rate: 0.1,
            iterations: 10,
        }
    }
}

impl FluvialErosion {
    /// Erodes the luminance of `source` and returns the result as a gray image.
    pub fn apply(&self, source: &PixelBuffer) -> Result<PixelBuffer> {
        let mut field = HeightField::from_buffer(source);
        self.erode(&mut field)?;
        field.to_buffer(source)
    }

    /// Runs the simulation on `field`.
    ///
    /// On return, sediment still in transport has been added back to the
    /// heights and every height is clamped to 0.0-1.0.
    pub fn erode(&self, field: &mut HeightField) -> Result<()> {
        if self.x >= field.width || self.y >= field.height {
            return Err(ImagingError::invalid(format!(
                "water source ({}, {}) outside {}x{} field",
                self.x, self.y, field.width, field.height
            )));
        }
        debug!(
            "fluvial erosion on {}x{} from ({}, {}), {} iterations",
            field.width, field.height, self.x, self.y, self.iterations
        );

        let cells = field.width * field.height;
        let mut water = vec![0.0f32; cells];
        let mut sediment = vec![0.0f32; cells];

        let seed = field.index(self.x, self.y);
        water[seed] = self.water;
        sediment[seed] = field.data[seed].min(self.pickup_rate);
        field.data[seed] = (field.data[seed] - self.pickup_rate).clamp(0.0, 1.0);

        let mut lowest: Vec<usize> = Vec::with_capacity(8);
        for _ in 0..self.iterations {
            for x in 0..field.width {
                for y in 0..field.height {
                    let here = field.index(x, y);
                    if water[here] <= 0.0 {
                        continue;
                    }

                    // Neighbors at the minimum height, counting ties with the cell itself.
                    lowest.clear();
                    let mut min_height = field.data[here];
                    for (nx, ny) in field.neighbors(x, y) {
                        let n = field.index(nx, ny);
                        if field.data[n] < min_height {
                            min_height = field.data[n];
                            lowest.clear();
                            lowest.push(n);
                        } else if field.data[n] == min_height {
                            lowest.push(n);
                        }
                    }

                    let level = water[here] + field.data[here];
                    let water_change = lowest
                        .iter()
                        .map(|&n| level - (water[n] + field.data[n]))
                        .fold(water[here], f32::min);

                    if water_change <= 0.0 {
                        field.data[here] += self.deposit_rate * sediment[here];
                        sediment[here] *= 1.0 - self.deposit_rate;
                        continue;
                    }

                    let capacity = water[here] * self.pickup_rate;
                    let share = lowest.len() as f32;
                    for &n in &lowest {
                        water[n] += water_change / share;
                        if sediment[here] >= capacity {
                            sediment[n] += capacity / share;
                        } else {
                            sediment[n] += sediment[here]
                                + self.pickup_rate * ((capacity - sediment[here]) / share);
                        }
                    }
                    if sediment[here] >= capacity {
                        field.data[here] += self.deposit_rate * (sediment[here] - capacity);
                        sediment[here] = (1.0 - self.deposit_rate) * (sediment[here] - capacity);
                    } else {
                        field.data[here] += self.deposit_rate * (capacity - sediment[here]);
                        sediment[here] = 0.0;
                    }
                    water[here] -= water_change;
                }
            }
        }

        for (h, s) in field.data.iter_mut().zip(&sediment) {
            *h = (*h + s).clamp(0.0, 1.0);
        }
        Ok(())
    }
}

// ============================================================================
// Thermal erosion
// ============================================================================

/// Slope relaxation: material slides from a cell to neighbors that are
/// lower by more than the talus threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermalErosion {
    /// Talus threshold `T`: minimum height difference that moves material.
    pub threshold: f32,
    /// Change factor `C`: fraction of the excess slope moved per visit.
    pub change: f32,
    pub iterations: usize,
}

impl Default for ThermalErosion {
    fn default() -> Self {
        Self {
            threshold: 0.05,
            change: 0.5,
            iterations: 10,
        }
    }
}

impl ThermalErosion {
    /// Erodes the luminance of `source` and returns the result as a gray image.
    pub fn apply(&self, source: &PixelBuffer) -> Result<PixelBuffer> {
        let mut field = HeightField::from_buffer(source);
        self.erode(&mut field);
        field.to_buffer(source)
    }

    /// Runs the simulation on `field`, updating cells in place.
    ///
    /// For a cell with maximum downhill difference `d_max` and over-threshold
    /// differences summing to `total`, each over-threshold neighbor receives
    /// `C * (d_max - T) * d / total` and the cell loses the same amount.
    /// Heights stay within -1.0..=1.0.
    pub fn erode(&self, field: &mut HeightField) {
        debug!(
            "thermal erosion on {}x{}: T={}, C={}, {} iterations",
            field.width, field.height, self.threshold, self.change, self.iterations
        );

        let mut diffs: Vec<(usize, f32)> = Vec::with_capacity(8);
        for _ in 0..self.iterations {
            for x in 0..field.width {
                for y in 0..field.height {
                    let here = field.index(x, y);
                    let center = field.data[here];

                    diffs.clear();
                    diffs.extend(
                        field
                            .neighbors(x, y)
                            .map(|(nx, ny)| field.index(nx, ny))
                            .map(|n| (n, center - field.data[n])),
                    );

                    let max_diff = diffs.iter().map(|&(_, d)| d).fold(0.0f32, f32::max);
                    let total: f32 = diffs
                        .iter()
                        .filter(|&&(_, d)| d > self.threshold)
                        .map(|&(_, d)| d)
                        .sum();
                    if total <= 0.0 {
                        continue;
                    }

                    let budget = self.change * (max_diff - self.threshold);
                    let mut moved = 0.0f32;
                    for &(n, d) in diffs.iter().filter(|&&(_, d)| d > self.threshold) {
                        let amount = budget * (d / total);
                        let before = field.data[n];
                        field.data[n] = (before + amount).clamp(-1.0, 1.0);
                        moved += field.data[n] - before;
                    }
                    field.data[here] = (center - moved).clamp(-1.0, 1.0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Color;

    fn gray(width: usize, height: usize, level: u8) -> PixelBuffer {
        PixelBuffer::filled(width, height, 3, Color::rgb(level, level, level)).unwrap()
    }

    #[test]
    fn test_height_field_from_buffer() {
        let mut img = gray(3, 2, 0);
        img.set(2, 1, Color::WHITE).unwrap();
        let field = HeightField::from_buffer(&img);
        assert_eq!(field.get(0, 0), 0.0);
        assert!((field.get(2, 1) - 1.0).abs() < 1e-3);
        assert_eq!(field.get(5, 5), 0.0);
    }

    #[test]
    fn test_neighbors_clip_at_corner() {
        let field = HeightField::new(3, 3);
        assert_eq!(field.neighbors(0, 0).count(), 3);
        assert_eq!(field.neighbors(1, 1).count(), 8);
        assert_eq!(
            field.neighbors(0, 0).collect::<Vec<_>>(),
            vec![(0, 1), (1, 0), (1, 1)]
        );
    }

    #[test]
    fn test_fluvial_rejects_source_outside_field() {
        let erosion = FluvialErosion {
            x: 4,
            ..Default::default()
        };
        assert!(erosion.apply(&gray(4, 4, 100)).is_err());
    }

    #[test]
    fn test_fluvial_zero_iterations_conserves_material() {
        // Pickup moves height into sediment; the final pass puts it back.
        let erosion = FluvialErosion {
            x: 1,
            y: 1,
            iterations: 0,
            ..Default::default()
        };
        let mut field = HeightField::from_buffer(&gray(3, 3, 128));
        let before = field.clone();
        erosion.erode(&mut field).unwrap();
        assert!((field.get(1, 1) - before.get(1, 1)).abs() < 1e-5);
    }

    #[test]
    fn test_fluvial_erodes_source_cell() {
        // Slope falling towards x = 4.
        let mut img = gray(5, 3, 0);
        for x in 0..5 {
            for y in 0..3 {
                let level = 200 - 40 * x as u8;
                img.set(x, y, Color::rgb(level, level, level)).unwrap();
            }
        }
        let erosion = FluvialErosion {
            x: 0,
            y: 1,
            water: 0.5,
            deposit_rate: 0.2,
            pickup_rate: 0.2,
            iterations: 8,
        };
        let out = erosion.apply(&img).unwrap();
        assert_eq!(out.dimensions(), (5, 3));
        // Source cell loses material.
        assert!(out.get(0, 1).unwrap().r < 200);
        // Untouched row far from the flow keeps its height.
        let c = out.get(4, 0).unwrap();
        assert_eq!(c.r, c.g);
    }

    fn fluvial_step(field: &mut HeightField) {
        let erosion = FluvialErosion {
            x: 1,
            y: 1,
            iterations: 1,
            ..Default::default()
        };
        erosion.erode(field).unwrap();
    }

    #[test]
    fn test_fluvial_tied_neighbors_split_flow_evenly() {
        // Two equally low cells left of the source at (0, 0) and (0, 2).
        let mut tied = HeightField::new(2, 3);
        for (x, y, h) in [(0, 0, 0.2), (0, 1, 0.9), (0, 2, 0.2), (1, 0, 0.9), (1, 1, 0.8), (1, 2, 0.9)] {
            tied.set(x, y, h);
        }
        let mut single = tied.clone();
        single.set(0, 2, 0.9);

        fluvial_step(&mut tied);
        fluvial_step(&mut single);

        assert!((tied.get(0, 0) - 0.225).abs() < 1e-5);
        assert!((tied.get(0, 2) - 0.225).abs() < 1e-5);
        assert!((single.get(0, 0) - 0.25).abs() < 1e-5);
        assert!((tied.get(1, 1) - 0.75).abs() < 1e-5);
        assert!((single.get(1, 1) - 0.75).abs() < 1e-5);

        // The same sediment arrives, shared between the tied cells.
        let tied_gain = tied.get(0, 0) + tied.get(0, 2) - 0.4;
        let single_gain = single.get(0, 0) - 0.2;
        assert!((tied_gain - single_gain).abs() < 1e-5);
        assert_eq!(tied.get(1, 0), 0.9);
        assert_eq!(tied.get(0, 1), 0.9);
    }

    #[test]
    fn test_thermal_flat_field_unchanged() {
        let img = gray(4, 4, 90);
        let out = ThermalErosion::default().apply(&img).unwrap();
        assert_eq!(out, HeightField::from_buffer(&img).to_buffer(&img).unwrap());
    }

    #[test]
    fn test_thermal_spreads_peak_and_conserves_mass() {
        let mut field = HeightField::new(3, 3);
        field.set(1, 1, 0.8);
        let erosion = ThermalErosion {
            threshold: 0.1,
            change: 0.5,
            iterations: 1,
        };
        erosion.erode(&mut field);

        let total: f32 = (0..3)
            .flat_map(|y| (0..3).map(move |x| (x, y)))
            .map(|(x, y)| field.get(x, y))
            .sum();
        assert!((total - 0.8).abs() < 1e-4);
        assert!(field.get(1, 1) < 0.8);
        assert!(field.get(0, 0) > 0.0);
    }

    #[test]
    fn test_thermal_below_threshold_is_stable() {
        let mut field = HeightField::new(3, 3);
        field.set(1, 1, 0.05);
        let before = field.clone();
        ThermalErosion {
            threshold: 0.1,
            change: 0.5,
            iterations: 5,
        }
        .erode(&mut field);
        assert_eq!(field, before);
    }
}
