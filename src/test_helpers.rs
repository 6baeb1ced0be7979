//! Shared test utilities: synthetic source images and archive readers.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let png = solid_png(10, 10, [255, 0, 0, 255]);
//! let archive = pipeline::generate(&png, None, &IconConfig::default(), None).unwrap();
//!
//! for (name, payload) in read_archive(archive.as_bytes()) {
//!     let img = decode_png(&payload);
//!     // ...
//! }
//! ```

use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use std::io::{Cursor, Read};

// =========================================================================
// Source images
// =========================================================================

/// Encode a single-color RGBA image as PNG.
pub fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(rgba));
    let mut png = Vec::new();
    image::codecs::png::PngEncoder::new(&mut png)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
        .unwrap();
    png
}

/// Encode a gradient RGB image as JPEG.
pub fn encode_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut jpeg = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut jpeg)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    jpeg
}

/// Decode PNG bytes, asserting the format.
pub fn decode_png(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .unwrap()
        .into_rgba8()
}

// =========================================================================
// Archive readers
// =========================================================================

/// Every entry name in archive order, directories included.
pub fn zip_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// `(name, payload)` for every file entry, in archive order.
pub fn read_archive(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut files = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        if file.is_dir() {
            continue;
        }
        let mut payload = Vec::new();
        file.read_to_end(&mut payload).unwrap();
        files.push((file.name().to_string(), payload));
    }
    files
}
