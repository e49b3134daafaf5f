//! Codec boundary: decode / encode through the `image` crate plus the
//! file-path entry points.
//!
//! - `decode` / `encode`: in-memory conversion between container bytes and
//!   [`PixelBuffer`].
//! - `load` / `save`: the same against the file system, with the output
//!   format picked by [`get_format`].
//! - `transform_file` / `load_or_placeholder`: fail-soft variants that skip
//!   files whose extension is not an image extension.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageBuffer, Rgb, Rgba};
use log::{debug, warn};

use crate::buffer::PixelBuffer;
use crate::error::{ImagingError, Result};
use crate::metadata::{get_format, is_supported_format, ImageFormat};

/// Decode container bytes. Images with alpha become RGBA, all others RGB.
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = (img.width() as usize, img.height() as usize);
    if img.color().has_alpha() {
        PixelBuffer::from_raw(width, height, 4, img.into_rgba8().into_raw())
    } else {
        PixelBuffer::from_raw(width, height, 3, img.into_rgb8().into_raw())
    }
}

/// Encode into `format`. JPEG drops the alpha channel.
pub fn encode(buffer: &PixelBuffer, format: ImageFormat) -> Result<Vec<u8>> {
    let mut img = to_dynamic(buffer)?;
    if format == ImageFormat::Jpeg && buffer.has_alpha() {
        img = DynamicImage::ImageRgb8(img.into_rgb8());
    }
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format.to_image_format())?;
    Ok(out.into_inner())
}

fn to_dynamic(buffer: &PixelBuffer) -> Result<DynamicImage> {
    let (width, height) = (buffer.width() as u32, buffer.height() as u32);
    let raw = buffer.to_raw();
    let img = if buffer.has_alpha() {
        ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, raw).map(DynamicImage::ImageRgba8)
    } else {
        ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, raw).map(DynamicImage::ImageRgb8)
    };
    img.ok_or_else(|| ImagingError::invalid("sample count does not match buffer dimensions"))
}

/// Read and decode an image file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<PixelBuffer> {
    let path = path.as_ref();
    debug!("loading {}", path.display());
    decode(&fs::read(path)?)
}

/// Encode and write, choosing the format from the file name.
pub fn save<P: AsRef<Path>>(buffer: &PixelBuffer, path: P) -> Result<()> {
    let path = path.as_ref();
    let format = get_format(&path.to_string_lossy());
    debug!("saving {} as {:?}", path.display(), format);
    fs::write(path, encode(buffer, format)?)?;
    Ok(())
}

/// Load `path`, or a 1x1 RGBA placeholder when the extension is not an image
/// extension.
pub fn load_or_placeholder<P: AsRef<Path>>(path: P) -> Result<PixelBuffer> {
    let path = path.as_ref();
    if !is_supported_format(&path.to_string_lossy()) {
        warn!("{} is not an image file, using placeholder", path.display());
        return PixelBuffer::new(1, 1, 4);
    }
    load(path)
}

/// Load `input`, run `op`, and save the result to `output`.
///
/// An `input` without an image extension is skipped with a warning and
/// nothing is written.
///
/// # Example
/// ```no_run
/// use pixelmill::filters::color_adjust::negative;
/// use pixelmill::io::transform_file;
///
/// transform_file("in.png", "out.jpg", |img| Ok(negative(img))).unwrap();
/// ```
pub fn transform_file<P, Q, F>(input: P, output: Q, op: F) -> Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    F: FnOnce(&PixelBuffer) -> Result<PixelBuffer>,
{
    let input = input.as_ref();
    if !is_supported_format(&input.to_string_lossy()) {
        warn!("skipping {}: unsupported extension", input.display());
        return Ok(());
    }
    let result = op(&load(input)?)?;
    save(&result, output)
}
