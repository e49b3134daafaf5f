//! Configurable 2-D convolution kernel.
//!
//! A [`ConvolutionFilter`] holds an odd-sized weight grid, an optional
//! absolute-value mode and an offset. Applying it produces a new buffer of
//! identical shape; the kernel itself is never modified.
//!
//! Neighbors that fall outside the source are skipped. Pixels near the border
//! therefore see only part of the kernel and the partial sum is used as-is,
//! without renormalizing the remaining weights.

use log::debug;
use ndarray::{arr2, Array2, Array3, Axis};
use rayon::prelude::*;

use crate::buffer::{clamp_channel_f32, PixelBuffer};
use crate::error::{ImagingError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ConvolutionFilter {
    /// Weights indexed `[[ky, kx]]`.
    kernel: Array2<f32>,
    absolute: bool,
    offset: f32,
}

impl ConvolutionFilter {
    /// Create a filter from a kernel with odd width and height.
    pub fn new(kernel: Array2<f32>) -> Result<Self> {
        let (rows, cols) = kernel.dim();
        if rows == 0 || cols == 0 || rows % 2 == 0 || cols % 2 == 0 {
            return Err(ImagingError::invalid(format!(
                "kernel dimensions must be odd and positive, got {}x{}",
                cols, rows
            )));
        }
        Ok(ConvolutionFilter {
            kernel,
            absolute: false,
            offset: 0.0,
        })
    }

    /// Uniform `size` x `size` kernel whose weights sum to 1.
    pub fn uniform(size: usize) -> Result<Self> {
        let weight = 1.0 / (size * size).max(1) as f32;
        ConvolutionFilter::new(Array2::from_elem((size, size), weight))
    }

    /// Take the absolute value of each channel sum before the offset.
    pub fn with_absolute(mut self, absolute: bool) -> Self {
        self.absolute = absolute;
        self
    }

    /// Constant added to each channel sum before clamping.
    pub fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    pub fn kernel(&self) -> &Array2<f32> {
        &self.kernel
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Convolve the RGB channels of `source`; alpha is carried over.
    pub fn apply(&self, source: &PixelBuffer) -> PixelBuffer {
        let (height, width, channels) = source.view().dim();
        let (k_rows, k_cols) = self.kernel.dim();
        let (center_y, center_x) = ((k_rows / 2) as isize, (k_cols / 2) as isize);
        debug!(
            "convolving {}x{} buffer with {}x{} kernel (absolute={}, offset={})",
            width, height, k_cols, k_rows, self.absolute, self.offset
        );

        let input = source.view();
        let kernel = &self.kernel;
        let mut output = Array3::<u8>::zeros((height, width, channels));

        output
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(y, mut row)| {
                for x in 0..width {
                    let mut sums = [0.0f32; 3];
                    for ky in 0..k_rows {
                        let sy = y as isize + ky as isize - center_y;
                        if sy < 0 || sy >= height as isize {
                            continue;
                        }
                        for kx in 0..k_cols {
                            let sx = x as isize + kx as isize - center_x;
                            if sx < 0 || sx >= width as isize {
                                continue;
                            }
                            let weight = kernel[[ky, kx]];
                            if weight == 0.0 {
                                continue;
                            }
                            for (c, sum) in sums.iter_mut().enumerate() {
                                *sum += weight * input[[sy as usize, sx as usize, c]] as f32;
                            }
                        }
                    }

                    for (c, sum) in sums.iter().enumerate() {
                        let mut v = *sum;
                        if self.absolute {
                            v = v.abs();
                        }
                        row[[x, c]] = clamp_channel_f32(v + self.offset);
                    }
                    if channels == 4 {
                        row[[x, 3]] = input[[y, x, 3]];
                    }
                }
            });

        PixelBuffer::from_shaped(output)
    }
}

// ============================================================================
// Named kernels
// ============================================================================

/// Sobel kernel responding to intensity changes between rows.
pub fn sobel_x() -> ConvolutionFilter {
    fixed(arr2(&[[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]]))
}

/// Sobel kernel responding to intensity changes between columns.
pub fn sobel_y() -> ConvolutionFilter {
    fixed(arr2(&[[1.0, 0.0, -1.0], [2.0, 0.0, -2.0], [1.0, 0.0, -1.0]]))
}

/// 5x5 Laplacian: 24 at the center, -1 elsewhere.
pub fn laplace_5x5() -> ConvolutionFilter {
    let mut kernel = Array2::from_elem((5, 5), -1.0f32);
    kernel[[2, 2]] = 24.0;
    fixed(kernel)
}

/// Strong sharpen, scaled to unit sum.
pub fn sharpen() -> ConvolutionFilter {
    fixed(arr2(&[[-1.0, -2.0, -1.0], [-2.0, 16.0, -2.0], [-1.0, -2.0, -1.0]]) / 4.0)
}

/// Mild sharpen, scaled to unit sum.
pub fn sharpen_less() -> ConvolutionFilter {
    fixed(arr2(&[[-1.0, 0.0, -1.0], [0.0, 7.0, 0.0], [-1.0, 0.0, -1.0]]) / 3.0)
}

pub fn emboss() -> ConvolutionFilter {
    fixed(arr2(&[[-2.0, -1.0, 0.0], [-1.0, 1.0, 1.0], [0.0, 1.0, 2.0]]))
}

/// Sobel kernel shifted to mid-gray.
pub fn sobel_emboss() -> ConvolutionFilter {
    sobel_x().with_offset(127.0)
}

fn fixed(kernel: Array2<f32>) -> ConvolutionFilter {
    ConvolutionFilter {
        kernel,
        absolute: false,
        offset: 0.0,
    }
}
