//! Edge and relief filters: Sobel, Laplace, Edge Detection, Sharpen, Emboss.
//!
//! Sobel and Laplace work on the luminance grayscale of the input and return
//! a negated response, so edges are dark on a white background.
//!
//! ## Supported Formats
//!
//! - **RGB**: (height, width, 3)
//! - **RGBA**: (height, width, 4) - alpha preserved

use super::color_adjust::{grayscale, negative};
use super::convolution;
use crate::buffer::{Color, PixelBuffer};

// ============================================================================
// Sobel / Laplace
// ============================================================================

/// Sobel edge detection.
///
/// Both directional responses are taken in absolute value, summed with
/// saturation, and negated.
pub fn sobel(source: &PixelBuffer) -> PixelBuffer {
    let gray = grayscale(source);
    let combined = {
        let gx = convolution::sobel_x().with_absolute(true).apply(&gray);
        let gy = convolution::sobel_y().with_absolute(true).apply(&gray);
        let mut sum = gray.with_alpha_of();
        for y in 0..gray.height() {
            for x in 0..gray.width() {
                let (a, b) = (gx.pixel(x, y), gy.pixel(x, y));
                sum.put_rgb(
                    x,
                    y,
                    a.r.saturating_add(b.r),
                    a.g.saturating_add(b.g),
                    a.b.saturating_add(b.b),
                );
            }
        }
        sum
    };
    negative(&combined)
}

/// Laplace edge detection with a 5x5 kernel, negated.
pub fn laplace(source: &PixelBuffer) -> PixelBuffer {
    let gray = grayscale(source);
    let response = convolution::laplace_5x5().apply(&gray);
    negative(&response)
}

// ============================================================================
// Edge Detection
// ============================================================================

/// Mark pixels that differ strongly from their lower-right neighbor.
///
/// Output starts as a copy of the source. A pixel is replaced with
/// `edge_color` when its RGB distance to the pixel at `(x + 1, y + 1)`
/// exceeds `threshold`. On the last column the pixel below is compared
/// instead, on the last row the pixel to the right. The bottom-right pixel
/// is never marked.
///
/// # Arguments
/// * `source` - Image to scan
/// * `threshold` - Euclidean RGB distance, 0.0-441.7
/// * `edge_color` - Color written onto edges
pub fn edge_detection(source: &PixelBuffer, threshold: f64, edge_color: Color) -> PixelBuffer {
    let (width, height) = source.dimensions();
    let mut output = source.clone();
    for y in 0..height {
        for x in 0..width {
            let neighbor = match (x + 1 < width, y + 1 < height) {
                (true, true) => (x + 1, y + 1),
                (false, true) => (x, y + 1),
                (true, false) => (x + 1, y),
                (false, false) => continue,
            };
            let current = source.pixel(x, y);
            if current.distance(&source.pixel(neighbor.0, neighbor.1)) > threshold {
                output.put(x, y, edge_color);
            }
        }
    }
    output
}

// ============================================================================
// Kernel shortcuts
// ============================================================================

pub fn sharpen(source: &PixelBuffer) -> PixelBuffer {
    convolution::sharpen().apply(source)
}

pub fn sharpen_less(source: &PixelBuffer) -> PixelBuffer {
    convolution::sharpen_less().apply(source)
}

pub fn emboss(source: &PixelBuffer) -> PixelBuffer {
    convolution::emboss().apply(source)
}

/// Directional relief centered on mid-gray.
pub fn sobel_emboss(source: &PixelBuffer) -> PixelBuffer {
    convolution::sobel_emboss().apply(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical_edge() -> PixelBuffer {
        let mut img = PixelBuffer::new(6, 6, 4).unwrap();
        for y in 0..6 {
            for x in 3..6 {
                img.set(x, y, Color::WHITE).unwrap();
            }
        }
        img
    }

    #[test]
    fn test_sobel_flat_is_white() {
        let img = PixelBuffer::filled(5, 5, 3, Color::rgb(90, 90, 90)).unwrap();
        assert_eq!(sobel(&img).get(2, 2).unwrap(), Color::WHITE);
    }

    #[test]
    fn test_sobel_marks_edge_dark() {
        let result = sobel(&vertical_edge());
        assert_eq!(result.get(2, 3).unwrap(), Color::BLACK);
        assert_eq!(result.get(0, 3).unwrap(), Color::WHITE);
    }

    #[test]
    fn test_laplace_flat_interior_is_white() {
        let img = PixelBuffer::filled(7, 7, 3, Color::rgb(128, 128, 128)).unwrap();
        assert_eq!(laplace(&img).get(3, 3).unwrap(), Color::WHITE);
    }

    #[test]
    fn test_edge_detection_marks_boundary() {
        let red = Color::rgb(255, 0, 0);
        let out = edge_detection(&vertical_edge(), 10.0, red);
        assert_eq!(out.get(2, 2).unwrap(), red);
        assert_eq!(out.get(0, 2).unwrap(), Color::BLACK);
        assert_eq!(out.get(4, 2).unwrap(), Color::WHITE);
        // Last row compares to the right neighbor
        assert_eq!(out.get(2, 5).unwrap(), red);
    }

    #[test]
    fn test_sobel_emboss_flat_is_mid_gray() {
        let img = PixelBuffer::filled(3, 3, 3, Color::rgb(40, 40, 40)).unwrap();
        assert_eq!(sobel_emboss(&img).get(1, 1).unwrap(), Color::rgb(127, 127, 127));
    }

    #[test]
    fn test_emboss_keeps_alpha() {
        let img = PixelBuffer::filled(3, 3, 4, Color::rgba(40, 40, 40, 9)).unwrap();
        assert_eq!(emboss(&img).as_array()[[1, 1, 3]], 9);
    }
}
