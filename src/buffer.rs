//! Owned pixel storage shared by every operation in the crate.
//!
//! ## Layout
//!
//! Pixels live in an `ndarray::Array3<u8>` of shape `(height, width, channels)`:
//! - **RGB**: 3 channels, red/green/blue
//! - **RGBA**: 4 channels, red/green/blue/alpha
//!
//! The channel count is fixed when the buffer is created. Operations never
//! write into their source; each one allocates a fresh buffer for its result.

use ndarray::{Array3, ArrayView3, ArrayViewMut3};

use crate::error::{ImagingError, Result};

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Opaque color from its three components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Opaque color from unbounded integer components, clamped to 0-255.
    pub fn clamped(r: i32, g: i32, b: i32) -> Self {
        Color::rgb(clamp_channel(r), clamp_channel(g), clamp_channel(b))
    }

    /// Euclidean distance between the RGB components of two colors.
    pub fn distance(&self, other: &Color) -> f64 {
        let dr = self.r as f64 - other.r as f64;
        let dg = self.g as f64 - other.g as f64;
        let db = self.b as f64 - other.b as f64;
        (dr * dr + dg * dg + db * db).sqrt()
    }

    /// HTML hex notation, e.g. `#041845`.
    pub fn to_html(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[inline]
pub(crate) fn clamp_channel(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

#[inline]
pub(crate) fn clamp_channel_f32(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Width x height grid of RGB or RGBA samples.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    data: Array3<u8>,
    palette: Option<Vec<Color>>,
}

impl PixelBuffer {
    /// Allocate an opaque black buffer.
    ///
    /// # Arguments
    /// * `width` - Width in pixels, must be positive
    /// * `height` - Height in pixels, must be positive
    /// * `channels` - 3 (RGB) or 4 (RGBA)
    pub fn new(width: usize, height: usize, channels: usize) -> Result<Self> {
        validate_shape(width, height, channels)?;
        let mut data = Array3::<u8>::zeros((height, width, channels));
        if channels == 4 {
            data.index_axis_mut(ndarray::Axis(2), 3).fill(255);
        }
        Ok(PixelBuffer { data, palette: None })
    }

    /// Allocate a buffer with every pixel set to `color`.
    pub fn filled(width: usize, height: usize, channels: usize, color: Color) -> Result<Self> {
        let mut buffer = PixelBuffer::new(width, height, channels)?;
        for y in 0..height {
            for x in 0..width {
                buffer.put(x, y, color);
            }
        }
        Ok(buffer)
    }

    /// Wrap an existing `(height, width, channels)` array.
    pub fn from_array(data: Array3<u8>) -> Result<Self> {
        let (height, width, channels) = data.dim();
        validate_shape(width, height, channels)?;
        // Internal loops rely on standard layout for row-parallel iteration.
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().to_owned()
        };
        Ok(PixelBuffer { data, palette: None })
    }

    /// Wrap an array produced inside the crate from a valid source shape.
    ///
    /// The caller guarantees `(height, width, 3 | 4)` with nonzero sides in
    /// standard layout.
    pub(crate) fn from_shaped(data: Array3<u8>) -> Self {
        debug_assert!(validate_shape(data.dim().1, data.dim().0, data.dim().2).is_ok());
        debug_assert!(data.is_standard_layout());
        PixelBuffer { data, palette: None }
    }

    /// Build from interleaved row-major samples.
    pub fn from_raw(width: usize, height: usize, channels: usize, samples: Vec<u8>) -> Result<Self> {
        validate_shape(width, height, channels)?;
        let expected = width * height * channels;
        if samples.len() != expected {
            return Err(ImagingError::invalid(format!(
                "expected {} samples for {}x{}x{}, got {}",
                expected,
                width,
                height,
                channels,
                samples.len()
            )));
        }
        let data = Array3::from_shape_vec((height, width, channels), samples)
            .map_err(|e| ImagingError::invalid(e.to_string()))?;
        Ok(PixelBuffer { data, palette: None })
    }

    /// Opaque black buffer with the same shape as `self`.
    pub fn blank_like(&self) -> Self {
        let (height, width, channels) = self.data.dim();
        let mut data = Array3::<u8>::zeros((height, width, channels));
        if channels == 4 {
            data.index_axis_mut(ndarray::Axis(2), 3).fill(255);
        }
        PixelBuffer { data, palette: None }
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    pub fn has_alpha(&self) -> bool {
        self.channels() == 4
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    pub fn same_dimensions(&self, other: &PixelBuffer) -> bool {
        self.dimensions() == other.dimensions()
    }

    /// Read a pixel; fails with `OutOfRange` outside the buffer.
    pub fn get(&self, x: i64, y: i64) -> Result<Color> {
        let (x, y) = self.check_bounds(x, y)?;
        Ok(self.pixel(x, y))
    }

    /// Write a pixel; fails with `OutOfRange` outside the buffer.
    ///
    /// The alpha component is ignored for RGB buffers.
    pub fn set(&mut self, x: i64, y: i64, color: Color) -> Result<()> {
        let (x, y) = self.check_bounds(x, y)?;
        self.put(x, y, color);
        Ok(())
    }

    /// Indexed palette attached with [`set_palette`](Self::set_palette), if any.
    pub fn palette(&self) -> Option<&[Color]> {
        self.palette.as_deref()
    }

    pub fn set_palette(&mut self, palette: Vec<Color>) {
        self.palette = Some(palette);
    }

    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    pub fn view_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        self.data.view_mut()
    }

    pub fn as_array(&self) -> &Array3<u8> {
        &self.data
    }

    pub fn into_array(self) -> Array3<u8> {
        self.data
    }

    /// Interleaved row-major samples.
    pub fn to_raw(&self) -> Vec<u8> {
        self.data.iter().copied().collect()
    }

    /// Unchecked read for loops that already stay within bounds.
    #[inline]
    pub(crate) fn pixel(&self, x: usize, y: usize) -> Color {
        let d = &self.data;
        let a = if d.dim().2 == 4 { d[[y, x, 3]] } else { 255 };
        Color::rgba(d[[y, x, 0]], d[[y, x, 1]], d[[y, x, 2]], a)
    }

    /// Unchecked write for loops that already stay within bounds.
    #[inline]
    pub(crate) fn put(&mut self, x: usize, y: usize, color: Color) {
        let has_alpha = self.has_alpha();
        let d = &mut self.data;
        d[[y, x, 0]] = color.r;
        d[[y, x, 1]] = color.g;
        d[[y, x, 2]] = color.b;
        if has_alpha {
            d[[y, x, 3]] = color.a;
        }
    }

    /// Alpha of the pixel, 255 for RGB buffers.
    #[inline]
    pub(crate) fn alpha(&self, x: usize, y: usize) -> u8 {
        if self.has_alpha() {
            self.data[[y, x, 3]]
        } else {
            255
        }
    }

    /// Write RGB and keep the alpha already stored at `(x, y)`.
    #[inline]
    pub(crate) fn put_rgb(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8) {
        let d = &mut self.data;
        d[[y, x, 0]] = r;
        d[[y, x, 1]] = g;
        d[[y, x, 2]] = b;
    }

    /// Buffer of the same shape carrying this buffer's alpha channel.
    ///
    /// Point operations fill in RGB and keep the source alpha.
    pub(crate) fn with_alpha_of(&self) -> Self {
        let mut out = self.blank_like();
        if self.has_alpha() {
            out.data
                .index_axis_mut(ndarray::Axis(2), 3)
                .assign(&self.data.index_axis(ndarray::Axis(2), 3));
        }
        out
    }

    fn check_bounds(&self, x: i64, y: i64) -> Result<(usize, usize)> {
        let (width, height) = self.dimensions();
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            return Err(ImagingError::OutOfRange { x, y, width, height });
        }
        Ok((x as usize, y as usize))
    }
}

fn validate_shape(width: usize, height: usize, channels: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ImagingError::invalid(format!(
            "buffer dimensions must be positive, got {}x{}",
            width, height
        )));
    }
    if channels != 3 && channels != 4 {
        return Err(ImagingError::invalid(format!(
            "channel count must be 3 or 4, got {}",
            channels
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_opaque_black() {
        let buf = PixelBuffer::new(2, 3, 4).unwrap();
        assert_eq!(buf.dimensions(), (2, 3));
        assert_eq!(buf.get(1, 2).unwrap(), Color::BLACK);
        assert_eq!(buf.as_array()[[2, 1, 3]], 255);
    }

    #[test]
    fn test_rejects_bad_shape() {
        assert!(matches!(
            PixelBuffer::new(0, 3, 3),
            Err(ImagingError::InvalidArgument(_))
        ));
        assert!(matches!(
            PixelBuffer::new(3, 3, 2),
            Err(ImagingError::InvalidArgument(_))
        ));
        assert!(PixelBuffer::from_raw(2, 2, 3, vec![0; 11]).is_err());
    }

    #[test]
    fn test_get_set_bounds() {
        let mut buf = PixelBuffer::new(4, 4, 3).unwrap();
        buf.set(3, 0, Color::rgb(1, 2, 3)).unwrap();
        assert_eq!(buf.get(3, 0).unwrap(), Color::rgb(1, 2, 3));

        assert!(matches!(
            buf.get(4, 0),
            Err(ImagingError::OutOfRange { x: 4, y: 0, .. })
        ));
        assert!(buf.get(0, -1).is_err());
        assert!(buf.set(-1, 0, Color::WHITE).is_err());
    }

    #[test]
    fn test_clamped_color() {
        assert_eq!(Color::clamped(-20, 300, 128), Color::rgb(0, 255, 128));
    }

    #[test]
    fn test_rgb_buffer_ignores_alpha() {
        let mut buf = PixelBuffer::new(1, 1, 3).unwrap();
        buf.set(0, 0, Color::rgba(10, 20, 30, 40)).unwrap();
        assert_eq!(buf.get(0, 0).unwrap(), Color::rgb(10, 20, 30));
    }

    #[test]
    fn test_html_color() {
        assert_eq!(Color::rgb(4, 24, 69).to_html(), "#041845");
    }
}
