//! Codec boundary and file pipeline.

use std::fs;
use std::path::PathBuf;

use pixelmill::filters::color_adjust::negative;
use pixelmill::io::{decode, encode, load, load_or_placeholder, save, transform_file};
use pixelmill::metadata::file_dimensions;
use pixelmill::{Color, ImageFormat, PixelBuffer};

fn sample(channels: usize) -> PixelBuffer {
    let mut img = PixelBuffer::new(5, 3, channels).unwrap();
    img.set(0, 0, Color::rgba(255, 0, 0, 255)).unwrap();
    img.set(4, 2, Color::rgba(10, 200, 30, 128)).unwrap();
    img.set(2, 1, Color::rgba(7, 8, 9, 0)).unwrap();
    img
}

/// Fully opaque RGBA image with a handful of colors.
fn opaque_sample() -> PixelBuffer {
    let mut img = PixelBuffer::filled(5, 3, 4, Color::rgb(20, 40, 60)).unwrap();
    img.set(0, 0, Color::rgb(255, 0, 0)).unwrap();
    img.set(4, 2, Color::rgb(10, 200, 30)).unwrap();
    img.set(2, 1, Color::WHITE).unwrap();
    img
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("pixelmill-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_png_roundtrip_keeps_alpha() {
    let img = sample(4);
    let bytes = encode(&img, ImageFormat::Png).unwrap();
    assert_eq!(decode(&bytes).unwrap(), img);
}

#[test]
fn test_png_roundtrip_rgb() {
    let img = sample(3);
    let decoded = decode(&encode(&img, ImageFormat::Png).unwrap()).unwrap();
    assert_eq!(decoded.channels(), 3);
    assert_eq!(decoded, img);
}

#[test]
fn test_bmp_roundtrip_rgb() {
    let img = sample(3);
    let decoded = decode(&encode(&img, ImageFormat::Bmp).unwrap()).unwrap();
    assert_eq!(decoded, img);
}

#[test]
fn test_tiff_roundtrip() {
    let img = sample(4);
    assert_eq!(decode(&encode(&img, ImageFormat::Tiff).unwrap()).unwrap(), img);
    let rgb = sample(3);
    assert_eq!(decode(&encode(&rgb, ImageFormat::Tiff).unwrap()).unwrap(), rgb);
}

#[test]
fn test_gif_roundtrip_opaque() {
    let img = opaque_sample();
    let decoded = decode(&encode(&img, ImageFormat::Gif).unwrap()).unwrap();
    assert_eq!(decoded.channels(), 4);
    assert_eq!(decoded, img);
}

#[test]
fn test_ico_roundtrip() {
    let img = opaque_sample();
    let decoded = decode(&encode(&img, ImageFormat::Icon).unwrap()).unwrap();
    assert_eq!(decoded.dimensions(), (5, 3));
    assert_eq!(decoded, img);
}

#[test]
fn test_save_and_load_by_extension() {
    let dir = scratch_dir("formats");
    for name in ["a.tiff", "b.gif", "c.ico"] {
        let path = dir.join(name);
        save(&opaque_sample(), &path).unwrap();
        assert_eq!(file_dimensions(&path), (5, 3), "{}", name);
        assert_eq!(load(&path).unwrap(), opaque_sample(), "{}", name);
    }
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_jpeg_drops_alpha() {
    let img = sample(4);
    let decoded = decode(&encode(&img, ImageFormat::Jpeg).unwrap()).unwrap();
    assert_eq!(decoded.dimensions(), (5, 3));
    assert_eq!(decoded.channels(), 3);
}

#[test]
fn test_decode_garbage_fails() {
    assert!(decode(b"not an image").is_err());
}

#[test]
fn test_transform_file_pipeline() {
    let dir = scratch_dir("pipeline");
    let input = dir.join("in.png");
    let output = dir.join("out.bmp");
    save(&sample(3), &input).unwrap();
    assert_eq!(file_dimensions(&input), (5, 3));

    transform_file(&input, &output, |img| Ok(negative(img))).unwrap();
    let result = load(&output).unwrap();
    assert_eq!(result, negative(&sample(3)));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_unsupported_input_is_skipped() {
    let dir = scratch_dir("skip");
    let input = dir.join("notes.txt");
    let output = dir.join("out.png");
    fs::write(&input, b"hello").unwrap();

    transform_file(&input, &output, |img| Ok(negative(img))).unwrap();
    assert!(!output.exists());

    let placeholder = load_or_placeholder(&input).unwrap();
    assert_eq!(placeholder.dimensions(), (1, 1));
    assert_eq!(file_dimensions(&input), (0, 0));

    fs::remove_dir_all(&dir).ok();
}
