//! Image metadata queries: format detection, dimensions, palettes.

use std::collections::HashSet;
use std::path::Path;

use log::warn;

use crate::buffer::{Color, PixelBuffer};

/// Extensions accepted by the file-path entry points.
const SUPPORTED_EXTENSIONS: [&str; 7] = ["ico", "tiff", "gif", "jpg", "jpeg", "png", "bmp"];

/// Container formats the codec layer reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Tiff,
    Icon,
    Gif,
    Bmp,
}

impl ImageFormat {
    /// Equivalent `image` crate format.
    pub fn to_image_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Tiff => image::ImageFormat::Tiff,
            ImageFormat::Icon => image::ImageFormat::Ico,
            ImageFormat::Gif => image::ImageFormat::Gif,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
        }
    }
}

fn ends_with_ignore_case(name: &str, suffix: &str) -> bool {
    name.len() >= suffix.len()
        && name.is_char_boundary(name.len() - suffix.len())
        && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

/// Pick an output format from a file name's ending, case-insensitively.
///
/// Anything unrecognized, including an empty name, maps to [`ImageFormat::Bmp`].
pub fn get_format(name: &str) -> ImageFormat {
    if ends_with_ignore_case(name, "jpg") || ends_with_ignore_case(name, "jpeg") {
        ImageFormat::Jpeg
    } else if ends_with_ignore_case(name, "png") {
        ImageFormat::Png
    } else if ends_with_ignore_case(name, "tiff") {
        ImageFormat::Tiff
    } else if ends_with_ignore_case(name, "ico") {
        ImageFormat::Icon
    } else if ends_with_ignore_case(name, "gif") {
        ImageFormat::Gif
    } else {
        ImageFormat::Bmp
    }
}

/// True when `name` ends in `.ico`, `.tiff`, `.gif`, `.jpg`, `.jpeg`, `.png`
/// or `.bmp`, ignoring case.
pub fn is_supported_format(name: &str) -> bool {
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|ext| ends_with_ignore_case(name, &format!(".{}", ext)))
}

/// `(width, height)` of a buffer.
pub fn dimensions(buffer: &PixelBuffer) -> (usize, usize) {
    buffer.dimensions()
}

/// `(width, height)` of an image file, read from its header.
///
/// Returns `(0, 0)` for unsupported extensions and unreadable files.
pub fn file_dimensions<P: AsRef<Path>>(path: P) -> (usize, usize) {
    let path = path.as_ref();
    if !is_supported_format(&path.to_string_lossy()) {
        return (0, 0);
    }
    match image::image_dimensions(path) {
        Ok((w, h)) => (w as usize, h as usize),
        Err(err) => {
            warn!("could not read dimensions of {}: {}", path.display(), err);
            (0, 0)
        }
    }
}

/// Distinct colors as `#RRGGBB`, in first-seen order.
///
/// An indexed palette is listed when present. Otherwise pixels are scanned
/// column by column.
pub fn html_palette(buffer: &PixelBuffer) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut listing = Vec::new();
    let mut push = |color: Color| {
        if seen.insert((color.r, color.g, color.b)) {
            listing.push(color.to_html());
        }
    };

    match buffer.palette() {
        Some(entries) if !entries.is_empty() => {
            entries.iter().for_each(|&c| push(c));
        }
        _ => {
            for x in 0..buffer.width() {
                for y in 0..buffer.height() {
                    push(buffer.pixel(x, y));
                }
            }
        }
    }
    listing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_format() {
        assert_eq!(get_format("a.PNG"), ImageFormat::Png);
        assert_eq!(get_format("photo.JpEg"), ImageFormat::Jpeg);
        assert_eq!(get_format("x.jpg"), ImageFormat::Jpeg);
        assert_eq!(get_format("scan.tiff"), ImageFormat::Tiff);
        assert_eq!(get_format("favicon.ico"), ImageFormat::Icon);
        assert_eq!(get_format("anim.gif"), ImageFormat::Gif);
        assert_eq!(get_format("a.xyz"), ImageFormat::Bmp);
        assert_eq!(get_format(""), ImageFormat::Bmp);
    }

    #[test]
    fn test_is_supported_format() {
        for name in ["a.ico", "b.TIFF", "c.gif", "d.Jpg", "e.jpeg", "f.png", "g.BMP"] {
            assert!(is_supported_format(name), "{}", name);
        }
        assert!(!is_supported_format("a.xyz"));
        assert!(!is_supported_format("png"));
        assert!(!is_supported_format("a.png.txt"));
        assert!(!is_supported_format(""));
    }

    #[test]
    fn test_html_palette_scan_order() {
        let mut buf = PixelBuffer::new(2, 2, 3).unwrap();
        buf.set(0, 1, Color::rgb(0x04, 0x18, 0x45)).unwrap();
        buf.set(1, 0, Color::WHITE).unwrap();
        assert_eq!(html_palette(&buf), vec!["#000000", "#041845", "#FFFFFF"]);
    }

    #[test]
    fn test_html_palette_many_colors() {
        let (width, height) = (256, 256);
        let mut samples = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            for x in 0..width {
                samples.extend_from_slice(&[x as u8, y as u8, 9, (x ^ y) as u8]);
            }
        }
        let buf = PixelBuffer::from_raw(width, height, 4, samples).unwrap();
        let palette = html_palette(&buf);
        assert_eq!(palette.len(), width * height);
        assert_eq!(palette[0], "#000009");
        assert_eq!(palette[1], "#000109");
        assert_eq!(palette[height], "#010009");
    }

    #[test]
    fn test_html_palette_ignores_alpha() {
        let mut buf = PixelBuffer::new(2, 1, 4).unwrap();
        buf.set(0, 0, Color::rgba(1, 2, 3, 10)).unwrap();
        buf.set(1, 0, Color::rgba(1, 2, 3, 200)).unwrap();
        assert_eq!(html_palette(&buf), vec!["#010203"]);
    }

    #[test]
    fn test_html_palette_prefers_indexed() {
        let mut buf = PixelBuffer::new(1, 1, 3).unwrap();
        buf.set_palette(vec![Color::WHITE, Color::rgb(255, 0, 0), Color::WHITE]);
        assert_eq!(html_palette(&buf), vec!["#FFFFFF", "#FF0000"]);
    }

    #[test]
    fn test_file_dimensions_fail_soft() {
        assert_eq!(file_dimensions("notes.txt"), (0, 0));
        assert_eq!(file_dimensions("/definitely/missing/file.png"), (0, 0));
    }
}
