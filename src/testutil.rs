//! Shared helpers for unit tests.

use image::{DynamicImage, ImageBuffer, Rgb};
use std::io::Cursor;

/// Encode a synthetic RGB image as PNG bytes.
pub(crate) fn encode_png(width: u32, height: u32, pixel: impl Fn(u32, u32) -> [u8; 3]) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| Rgb(pixel(x, y)));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

/// A smooth gradient image; perceptually stable across encodes.
pub(crate) fn gradient_png(width: u32, height: u32) -> Vec<u8> {
    encode_png(width, height, |x, y| {
        [(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 64]
    })
}

/// A checkerboard image, perceptually far from the gradient.
pub(crate) fn checkerboard_png(width: u32, height: u32) -> Vec<u8> {
    encode_png(width, height, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            [255, 255, 255]
        } else {
            [0, 0, 0]
        }
    })
}
