//! Pixelmill
//!
//! Pixel-level image processing on in-memory RGB/RGBA buffers: convolution
//! kernels, color matrices, histogram equalization, blurs, edge detection,
//! stylize effects, Perlin noise, terrain erosion and geometric transforms,
//! with Python bindings via PyO3 and WASM bindings for JavaScript.
//!
//! ## Image Format
//! Every operation works on a [`PixelBuffer`], an `ndarray` of shape
//! `(height, width, channels)`:
//! - **RGB**: (height, width, 3)
//! - **RGBA**: (height, width, 4), alpha carried through unchanged
//!
//! Operations never mutate their input; each returns a freshly allocated
//! buffer.
//!
//! ## Layout
//! - [`buffer`]: the pixel container and [`Color`]
//! - [`filters`]: kernels, color transforms and the filter catalog
//! - [`perlin`], [`erosion`]: procedural generators and height-field effects
//! - [`geometry`]: crop, resize, rotate, flip
//! - [`metadata`], [`io`]: format detection and the codec boundary

pub mod buffer;
pub mod erosion;
pub mod error;
pub mod filters;
pub mod geometry;
pub mod io;
pub mod metadata;
pub mod perlin;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use buffer::{Color, PixelBuffer};
pub use error::{ImagingError, Result};
pub use metadata::ImageFormat;

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::prelude::*;

    use crate::buffer::{Color, PixelBuffer};
    use crate::erosion::{FluvialErosion, ThermalErosion};
    use crate::filters::{blur, color_adjust, combine, edge, morphology, noise, stylize};
    use crate::geometry::{self, HorizontalAlign, Quality, VerticalAlign};
    use crate::perlin::PerlinNoise;

    type PyImage<'py> = Bound<'py, PyArray3<u8>>;

    fn to_buffer(image: PyReadonlyArray3<'_, u8>) -> PyResult<PixelBuffer> {
        Ok(PixelBuffer::from_array(image.as_array().to_owned())?)
    }

    fn to_py(py: Python<'_>, buffer: PixelBuffer) -> PyImage<'_> {
        buffer.into_array().into_pyarray(py)
    }

    fn color((r, g, b): (u8, u8, u8)) -> Color {
        Color::rgb(r, g, b)
    }

    // ========================================================================
    // Point Operations
    // ========================================================================

    /// Invert R, G and B.
    #[pyfunction]
    pub fn negative<'py>(py: Python<'py>, image: PyReadonlyArray3<'py, u8>) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, color_adjust::negative(&to_buffer(image)?)))
    }

    /// Pure black/white by luminance sum.
    #[pyfunction]
    #[pyo3(signature = (image, threshold=0.5))]
    pub fn threshold<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        threshold: f32,
    ) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, color_adjust::threshold(&to_buffer(image)?, threshold)))
    }

    /// Shift brightness by `value` (-255 to 255).
    #[pyfunction]
    pub fn brightness<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        value: i32,
    ) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, color_adjust::brightness(&to_buffer(image)?, value)))
    }

    /// Scale contrast by `value` (-100 to 100).
    #[pyfunction]
    pub fn contrast<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        value: f32,
    ) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, color_adjust::contrast(&to_buffer(image)?, value)))
    }

    /// Apply a gamma curve.
    #[pyfunction]
    pub fn gamma<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        gamma: f32,
    ) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, color_adjust::gamma(&to_buffer(image)?, gamma)?))
    }

    /// Luminance grayscale.
    #[pyfunction]
    pub fn grayscale<'py>(py: Python<'py>, image: PyReadonlyArray3<'py, u8>) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, color_adjust::grayscale(&to_buffer(image)?)))
    }

    /// Sepia tone.
    #[pyfunction]
    pub fn sepia<'py>(py: Python<'py>, image: PyReadonlyArray3<'py, u8>) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, color_adjust::sepia(&to_buffer(image)?)))
    }

    /// Keep a single color channel: "red", "green" or "blue".
    #[pyfunction]
    pub fn channel_filter<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        channel: &str,
    ) -> PyResult<PyImage<'py>> {
        let buffer = to_buffer(image)?;
        let out = match channel {
            "red" => color_adjust::red_filter(&buffer),
            "green" => color_adjust::green_filter(&buffer),
            "blue" => color_adjust::blue_filter(&buffer),
            other => {
                return Err(pyo3::exceptions::PyValueError::new_err(format!(
                    "unknown channel '{}'",
                    other
                )))
            }
        };
        Ok(to_py(py, out))
    }

    /// Map the red channel through a 256-entry RGB palette.
    #[pyfunction]
    pub fn colorize<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        palette: Vec<(u8, u8, u8)>,
    ) -> PyResult<PyImage<'py>> {
        let palette: Vec<Color> = palette.into_iter().map(color).collect();
        Ok(to_py(py, color_adjust::colorize(&to_buffer(image)?, &palette)?))
    }

    /// Stretch each channel to the full 0-255 range.
    #[pyfunction]
    pub fn stretch_contrast<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, color_adjust::stretch_contrast(&to_buffer(image)?)))
    }

    /// Histogram equalization.
    #[pyfunction]
    pub fn equalize<'py>(py: Python<'py>, image: PyReadonlyArray3<'py, u8>) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, color_adjust::equalize(&to_buffer(image)?)))
    }

    // ========================================================================
    // Blur / Edges / Morphology
    // ========================================================================

    /// Box blur with an odd aperture.
    #[pyfunction]
    #[pyo3(signature = (image, size=3))]
    pub fn box_blur<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        size: usize,
    ) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, blur::box_blur(&to_buffer(image)?, size)?))
    }

    /// Gaussian approximation by three box passes.
    #[pyfunction]
    #[pyo3(signature = (image, size=3))]
    pub fn gaussian_blur<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        size: usize,
    ) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, blur::gaussian_blur(&to_buffer(image)?, size)?))
    }

    /// Per-channel median.
    #[pyfunction]
    #[pyo3(signature = (image, size=3))]
    pub fn median<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        size: usize,
    ) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, blur::median(&to_buffer(image)?, size)?))
    }

    /// Kuwahara edge-preserving smoothing.
    #[pyfunction]
    #[pyo3(signature = (image, size=3))]
    pub fn kuwahara<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        size: usize,
    ) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, blur::kuwahara(&to_buffer(image)?, size)?))
    }

    /// Symmetric nearest neighbor smoothing.
    #[pyfunction]
    #[pyo3(signature = (image, size=3))]
    pub fn snn<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        size: usize,
    ) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, blur::snn(&to_buffer(image)?, size)?))
    }

    /// Per-channel maximum.
    #[pyfunction]
    #[pyo3(signature = (image, size=3))]
    pub fn dilate<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        size: usize,
    ) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, morphology::dilate(&to_buffer(image)?, size)?))
    }

    /// Sobel edge magnitude, dark edges on white.
    #[pyfunction]
    pub fn sobel<'py>(py: Python<'py>, image: PyReadonlyArray3<'py, u8>) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, edge::sobel(&to_buffer(image)?)))
    }

    /// 5x5 Laplacian edges, dark edges on white.
    #[pyfunction]
    pub fn laplace<'py>(py: Python<'py>, image: PyReadonlyArray3<'py, u8>) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, edge::laplace(&to_buffer(image)?)))
    }

    /// Mark pixels whose neighbor differs by more than `threshold`.
    #[pyfunction]
    #[pyo3(signature = (image, threshold, edge_color=(0, 0, 0)))]
    pub fn edge_detection<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        threshold: f64,
        edge_color: (u8, u8, u8),
    ) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, edge::edge_detection(&to_buffer(image)?, threshold, color(edge_color))))
    }

    /// Sharpen kernel.
    #[pyfunction]
    pub fn sharpen<'py>(py: Python<'py>, image: PyReadonlyArray3<'py, u8>) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, edge::sharpen(&to_buffer(image)?)))
    }

    /// Emboss kernel.
    #[pyfunction]
    pub fn emboss<'py>(py: Python<'py>, image: PyReadonlyArray3<'py, u8>) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, edge::emboss(&to_buffer(image)?)))
    }

    // ========================================================================
    // Stylize / Noise / Combine
    // ========================================================================

    /// Block mosaic.
    #[pyfunction]
    pub fn pixelate<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        pixel_size: usize,
    ) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, stylize::pixelate(&to_buffer(image)?, pixel_size)?))
    }

    /// Sinusoidal displacement.
    #[pyfunction]
    #[pyo3(signature = (image, amplitude, frequency, x_direction=true, y_direction=true))]
    pub fn sin_wave<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        amplitude: f32,
        frequency: f32,
        x_direction: bool,
        y_direction: bool,
    ) -> PyResult<PyImage<'py>> {
        let buffer = to_buffer(image)?;
        Ok(to_py(py, stylize::sin_wave(&buffer, amplitude, frequency, x_direction, y_direction)))
    }

    /// Perlin-noise displacement.
    #[pyfunction]
    #[pyo3(signature = (image, roughness=8, power=5.0, seed=0))]
    pub fn turbulence<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        roughness: u32,
        power: f32,
        seed: u64,
    ) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, stylize::turbulence(&to_buffer(image)?, roughness, power, seed)?))
    }

    /// Uniform per-channel noise.
    #[pyfunction]
    #[pyo3(signature = (image, amount, seed=0))]
    pub fn add_noise<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        amount: u8,
        seed: u64,
    ) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, noise::add_noise(&to_buffer(image)?, amount, seed)))
    }

    /// Random neighbor resampling.
    #[pyfunction]
    #[pyo3(signature = (image, max_jitter, seed=0))]
    pub fn jitter<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        max_jitter: usize,
        seed: u64,
    ) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, noise::jitter(&to_buffer(image)?, max_jitter, seed)))
    }

    /// Channel-wise bitwise combination: "and", "or" or "xor".
    #[pyfunction]
    pub fn bitwise<'py>(
        py: Python<'py>,
        first: PyReadonlyArray3<'py, u8>,
        second: PyReadonlyArray3<'py, u8>,
        op: &str,
    ) -> PyResult<PyImage<'py>> {
        let (a, b) = (to_buffer(first)?, to_buffer(second)?);
        let out = match op {
            "and" => combine::and(&a, &b)?,
            "or" => combine::or(&a, &b)?,
            "xor" => combine::xor(&a, &b)?,
            other => {
                return Err(pyo3::exceptions::PyValueError::new_err(format!(
                    "unknown bitwise op '{}'",
                    other
                )))
            }
        };
        Ok(to_py(py, out))
    }

    /// Composite `mark` over `base`.
    #[pyfunction]
    #[pyo3(signature = (base, mark, opacity, x, y, key=None))]
    pub fn watermark<'py>(
        py: Python<'py>,
        base: PyReadonlyArray3<'py, u8>,
        mark: PyReadonlyArray3<'py, u8>,
        opacity: f32,
        x: i64,
        y: i64,
        key: Option<(u8, u8, u8)>,
    ) -> PyResult<PyImage<'py>> {
        let (base, mark) = (to_buffer(base)?, to_buffer(mark)?);
        Ok(to_py(py, combine::watermark(&base, &mark, opacity, x, y, key.map(color))?))
    }

    // ========================================================================
    // Generators / Erosion
    // ========================================================================

    /// Perlin noise texture (RGB).
    #[pyfunction]
    #[pyo3(signature = (width, height, max_value=255, min_value=0, frequency=0.0625, amplitude=1.0, persistence=0.5, octaves=4, seed=0))]
    #[allow(clippy::too_many_arguments)]
    pub fn perlin_noise(
        py: Python<'_>,
        width: usize,
        height: usize,
        max_value: u8,
        min_value: u8,
        frequency: f32,
        amplitude: f32,
        persistence: f32,
        octaves: u32,
        seed: u64,
    ) -> PyResult<PyImage<'_>> {
        let noise = PerlinNoise {
            max_value,
            min_value,
            frequency,
            amplitude,
            persistence,
            octaves,
            seed,
        };
        Ok(to_py(py, noise.generate(width, height)?))
    }

    /// Water-flow erosion seeded at `(x, y)`.
    #[pyfunction]
    #[pyo3(signature = (image, x, y, water=0.5, deposit_rate=0.1, pickup_rate=0.1, iterations=10))]
    #[allow(clippy::too_many_arguments)]
    pub fn fluvial_erosion<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        x: usize,
        y: usize,
        water: f32,
        deposit_rate: f32,
        pickup_rate: f32,
        iterations: usize,
    ) -> PyResult<PyImage<'py>> {
        let erosion = FluvialErosion {
            x,
            y,
            water,
            deposit_rate,
            pickup_rate,
            iterations,
        };
        Ok(to_py(py, erosion.apply(&to_buffer(image)?)?))
    }

    /// Slope-limited thermal erosion.
    #[pyfunction]
    #[pyo3(signature = (image, threshold=0.05, change=0.5, iterations=10))]
    pub fn thermal_erosion<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        threshold: f32,
        change: f32,
        iterations: usize,
    ) -> PyResult<PyImage<'py>> {
        let erosion = ThermalErosion {
            threshold,
            change,
            iterations,
        };
        Ok(to_py(py, erosion.apply(&to_buffer(image)?)?))
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Corner crop; `bottom` / `right` select the anchor.
    #[pyfunction]
    #[pyo3(signature = (image, width, height, bottom=false, right=false))]
    pub fn crop<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        width: usize,
        height: usize,
        bottom: bool,
        right: bool,
    ) -> PyResult<PyImage<'py>> {
        let vertical = if bottom { VerticalAlign::Bottom } else { VerticalAlign::Top };
        let horizontal = if right { HorizontalAlign::Right } else { HorizontalAlign::Left };
        Ok(to_py(py, geometry::crop(&to_buffer(image)?, width, height, vertical, horizontal)?))
    }

    /// Resample to `width` x `height`; `high_quality` selects bicubic.
    #[pyfunction]
    #[pyo3(signature = (image, width, height, high_quality=true))]
    pub fn resize<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        width: usize,
        height: usize,
        high_quality: bool,
    ) -> PyResult<PyImage<'py>> {
        let quality = if high_quality { Quality::High } else { Quality::Low };
        Ok(to_py(py, geometry::resize(&to_buffer(image)?, width, height, quality)?))
    }

    /// Scale so the longer side equals `max_side`.
    #[pyfunction]
    pub fn resize_to_max_side<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        max_side: usize,
    ) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, geometry::resize_to_max_side(&to_buffer(image)?, max_side)?))
    }

    /// Rotate clockwise about the center.
    #[pyfunction]
    pub fn rotate<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        degrees: f32,
    ) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, geometry::rotate(&to_buffer(image)?, degrees)))
    }

    /// Mirror horizontally and/or vertically.
    #[pyfunction]
    #[pyo3(signature = (image, flip_x=true, flip_y=false))]
    pub fn flip<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        flip_x: bool,
        flip_y: bool,
    ) -> PyResult<PyImage<'py>> {
        Ok(to_py(py, geometry::flip(&to_buffer(image)?, flip_x, flip_y)))
    }

    /// Python module definition
    #[pymodule]
    pub fn pixelmill(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Point operations
        m.add_function(wrap_pyfunction!(negative, m)?)?;
        m.add_function(wrap_pyfunction!(threshold, m)?)?;
        m.add_function(wrap_pyfunction!(brightness, m)?)?;
        m.add_function(wrap_pyfunction!(contrast, m)?)?;
        m.add_function(wrap_pyfunction!(gamma, m)?)?;
        m.add_function(wrap_pyfunction!(grayscale, m)?)?;
        m.add_function(wrap_pyfunction!(sepia, m)?)?;
        m.add_function(wrap_pyfunction!(channel_filter, m)?)?;
        m.add_function(wrap_pyfunction!(colorize, m)?)?;
        m.add_function(wrap_pyfunction!(stretch_contrast, m)?)?;
        m.add_function(wrap_pyfunction!(equalize, m)?)?;

        // Blur, edges, morphology
        m.add_function(wrap_pyfunction!(box_blur, m)?)?;
        m.add_function(wrap_pyfunction!(gaussian_blur, m)?)?;
        m.add_function(wrap_pyfunction!(median, m)?)?;
        m.add_function(wrap_pyfunction!(kuwahara, m)?)?;
        m.add_function(wrap_pyfunction!(snn, m)?)?;
        m.add_function(wrap_pyfunction!(dilate, m)?)?;
        m.add_function(wrap_pyfunction!(sobel, m)?)?;
        m.add_function(wrap_pyfunction!(laplace, m)?)?;
        m.add_function(wrap_pyfunction!(edge_detection, m)?)?;
        m.add_function(wrap_pyfunction!(sharpen, m)?)?;
        m.add_function(wrap_pyfunction!(emboss, m)?)?;

        // Stylize, noise, combine
        m.add_function(wrap_pyfunction!(pixelate, m)?)?;
        m.add_function(wrap_pyfunction!(sin_wave, m)?)?;
        m.add_function(wrap_pyfunction!(turbulence, m)?)?;
        m.add_function(wrap_pyfunction!(add_noise, m)?)?;
        m.add_function(wrap_pyfunction!(jitter, m)?)?;
        m.add_function(wrap_pyfunction!(bitwise, m)?)?;
        m.add_function(wrap_pyfunction!(watermark, m)?)?;

        // Generators and erosion
        m.add_function(wrap_pyfunction!(perlin_noise, m)?)?;
        m.add_function(wrap_pyfunction!(fluvial_erosion, m)?)?;
        m.add_function(wrap_pyfunction!(thermal_erosion, m)?)?;

        // Geometry
        m.add_function(wrap_pyfunction!(crop, m)?)?;
        m.add_function(wrap_pyfunction!(resize, m)?)?;
        m.add_function(wrap_pyfunction!(resize_to_max_side, m)?)?;
        m.add_function(wrap_pyfunction!(rotate, m)?)?;
        m.add_function(wrap_pyfunction!(flip, m)?)?;

        Ok(())
    }
}
