//! Filter modules for image processing effects.
//!
//! ## Supported Formats
//!
//! All filters accept [`PixelBuffer`](crate::PixelBuffer)s with 3 or 4 channels:
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | RGB8 | (H, W, 3) | u8 | Red, green, blue, 0-255 |
//! | RGBA8 | (H, W, 4) | u8 | RGB + alpha, 0-255 |
//!
//! ## Architecture
//!
//! All filters follow these principles:
//! - **Pure** - The source is only read; a new buffer is returned
//! - **Alpha preservation** - Alpha (if present) is carried from the source
//! - **Fallible only on parameters** - Bad sizes or palettes return
//!   `InvalidArgument`, never a partial result
//!
//! ## Filter Categories
//!
//! - **Kernels**: [`convolution::ConvolutionFilter`] and its named kernels
//! - **Color**: [`color_matrix::ColorMatrix`], [`histogram::Histogram`], and the
//!   point operations in [`color_adjust`]
//! - **Blur**: box, gaussian, median, kuwahara, snn
//! - **Edge detection**: sobel, laplace, edge_detection, sharpen, emboss
//! - **Stylize**: pixelate, sin_wave, turbulence
//! - **Noise**: add_noise, jitter
//! - **Morphology**: dilate
//! - **Combine**: and, or, xor, watermark

pub mod blur;
pub mod color_adjust;
pub mod color_matrix;
pub mod combine;
pub mod convolution;
pub mod edge;
pub mod histogram;
pub mod morphology;
pub mod noise;
pub mod stylize;

pub(crate) mod core;
