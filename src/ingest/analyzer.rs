//! Image analysis: content-type sniffing, decoding, perceptual and
//! cryptographic hashing, resolution extraction.

use image::DynamicImage;
use img_hash::HasherConfig;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Number of bytes in the canonical perceptual hash (64-bit gradient hash).
pub const PHASH_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct ImageAnalysis {
    /// Canonical file extension for the sniffed format.
    pub ext: &'static str,
    /// MIME type as sniffed from the leading bytes.
    pub content_type: &'static str,
    /// Lower-hex SHA-256 of the exact original bytes.
    pub content_hash: String,
    /// 64-bit perceptual hash in canonical byte order.
    pub phash: Vec<u8>,
    /// `"{w}x{h}p"` from the decoded pixel grid.
    pub resolution: String,
}

/// Analyze an uploaded byte buffer.
///
/// The content type is sniffed from the bytes themselves, never taken from
/// request headers. Exactly JPEG, PNG, GIF and WebP are accepted; everything
/// else is a client error, as is a buffer that fails to decode.
pub fn analyze(bytes: &[u8]) -> Result<ImageAnalysis> {
    let (ext, content_type, format) = sniff_format(bytes)?;

    let img = image::load_from_memory_with_format(bytes, format).map_err(|e| {
        tracing::warn!(content_type, error = %e, "error reading image");
        Error::InvalidInput("error reading image".to_string())
    })?;

    let resolution = format!("{}x{}p", img.width(), img.height());
    let phash = perceptual_hash(&img)?;
    let content_hash = format!("{:x}", Sha256::digest(bytes));

    Ok(ImageAnalysis {
        ext,
        content_type,
        content_hash,
        phash,
        resolution,
    })
}

fn sniff_format(bytes: &[u8]) -> Result<(&'static str, &'static str, image::ImageFormat)> {
    let kind = infer::get(bytes);
    match kind.map(|k| k.mime_type()) {
        Some("image/jpeg") => Ok(("jpg", "image/jpeg", image::ImageFormat::Jpeg)),
        Some("image/png") => Ok(("png", "image/png", image::ImageFormat::Png)),
        Some("image/gif") => Ok(("gif", "image/gif", image::ImageFormat::Gif)),
        Some("image/webp") => Ok(("webp", "image/webp", image::ImageFormat::WebP)),
        Some(other) => {
            tracing::warn!(mime = other, "unsupported upload type");
            Err(Error::UnsupportedMedia(other.to_string()))
        }
        None => Err(Error::UnsupportedMedia("unknown".to_string())),
    }
}

/// 64-bit gradient hash over a small thumbnail. Visually similar images
/// produce hashes with small Hamming distance.
fn perceptual_hash(img: &DynamicImage) -> Result<Vec<u8>> {
    // thumbnail() preserves aspect ratio and is much faster than resize
    // for large inputs; the hasher rescales to 8x8 internally anyway.
    let thumbnail = img.thumbnail(64, 64);

    let hasher = HasherConfig::new().hash_size(8, 8).to_hasher();

    // img_hash bundles its own image-crate version, so hand it raw pixels.
    let rgba = thumbnail.to_rgba8();
    let (width, height) = rgba.dimensions();
    let hash_input = img_hash::image::RgbaImage::from_raw(width, height, rgba.into_raw())
        .ok_or_else(|| Error::Internal("could not prepare image for hashing".to_string()))?;

    let hash = hasher.hash_image(&img_hash::image::DynamicImage::ImageRgba8(hash_input));
    let bytes = hash.as_bytes().to_vec();
    debug_assert_eq!(bytes.len(), PHASH_LEN);
    Ok(bytes)
}

/// Hamming distance between two perceptual hashes (bitwise XOR popcount).
/// Hashes of different lengths are never similar.
pub fn hamming_distance(a: &[u8], b: &[u8]) -> u32 {
    if a.len() != b.len() {
        return u32::MAX;
    }
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x ^ y).count_ones())
        .sum()
}
