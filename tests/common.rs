#![allow(dead_code)]

use image::{ImageFormat, Rgb, RgbImage};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Smooth RGB gradient, compresses well in every format.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    })
}

/// Pseudo-random pixels. PNG barely compresses these, so the encoded file is
/// close to `width * height * 3` bytes.
pub fn noise_image(width: u32, height: u32) -> RgbImage {
    let mut state: u32 = 0x2545_f491;
    RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        };
        Rgb([next(), next(), next()])
    })
}

pub fn encode(image: &RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

pub fn gradient_png(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient_image(width, height), ImageFormat::Png)
}

pub fn gradient_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient_image(width, height), ImageFormat::Jpeg)
}

pub fn noise_png(width: u32, height: u32) -> Vec<u8> {
    encode(&noise_image(width, height), ImageFormat::Png)
}

pub fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Two valid images, one corrupt JPEG, a text file, a hidden image and a
/// nested image one level down.
pub fn create_mixed_directory(dir: &Path) {
    write_file(dir, "a.png", &gradient_png(64, 48));
    write_file(dir, "b.jpg", &gradient_jpeg(40, 40));
    write_file(dir, "corrupt.jpg", b"definitely not a jpeg");
    write_file(dir, "notes.txt", b"not an image");
    write_file(dir, ".hidden.png", &gradient_png(8, 8));

    let subdir = dir.join("subdir");
    fs::create_dir(&subdir).unwrap();
    write_file(&subdir, "nested.png", &gradient_png(16, 16));
}

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}
