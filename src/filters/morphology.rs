//! Morphology filters: Dilate.
//!
//! ## Supported Formats
//!
//! - **RGB**: (height, width, 3) - processes all 3 channels
//! - **RGBA**: (height, width, 4) - processes RGB, preserves alpha

use super::core::{aperture_half, for_each_in_window};
use crate::buffer::PixelBuffer;
use crate::error::Result;

// ============================================================================
// Dilate
// ============================================================================

/// Apply dilation to an image.
///
/// Each channel takes the maximum value in the square neighborhood,
/// making bright regions grow and dark regions shrink.
///
/// # Arguments
/// * `source` - Image to dilate
/// * `size` - Aperture side, at least 1
///
/// # Returns
/// Dilated image with same channel count
pub fn dilate(source: &PixelBuffer, size: usize) -> Result<PixelBuffer> {
    let half = aperture_half(size, "dilate")?;
    let mut output = source.with_alpha_of();

    for y in 0..source.height() {
        for x in 0..source.width() {
            let mut max_val = [0u8; 3];
            for_each_in_window(source, x, y, half, |_, _, c| {
                max_val[0] = max_val[0].max(c.r);
                max_val[1] = max_val[1].max(c.g);
                max_val[2] = max_val[2].max(c.b);
            });
            output.put_rgb(x, y, max_val[0], max_val[1], max_val[2]);
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Color;

    #[test]
    fn test_dilate_grows_bright() {
        let mut img = PixelBuffer::new(5, 5, 4).unwrap();
        // Single bright pixel in center
        img.set(2, 2, Color::rgb(255, 0, 0)).unwrap();

        let result = dilate(&img, 3).unwrap();

        assert_eq!(result.get(1, 1).unwrap().r, 255);
        assert_eq!(result.get(3, 2).unwrap().r, 255);
        assert_eq!(result.get(0, 0).unwrap().r, 0);
        assert_eq!(result.get(2, 2).unwrap().g, 0);
    }

    #[test]
    fn test_dilate_channels_independent() {
        let mut img = PixelBuffer::new(2, 1, 3).unwrap();
        img.set(0, 0, Color::rgb(200, 0, 10)).unwrap();
        img.set(1, 0, Color::rgb(0, 150, 20)).unwrap();

        let result = dilate(&img, 3).unwrap();
        assert_eq!(result.get(0, 0).unwrap(), Color::rgb(200, 150, 20));
    }

    #[test]
    fn test_dilate_size_one_is_identity() {
        let mut img = PixelBuffer::new(3, 3, 3).unwrap();
        img.set(1, 1, Color::WHITE).unwrap();
        assert_eq!(dilate(&img, 1).unwrap(), img);
        assert!(dilate(&img, 0).is_err());
    }
}
