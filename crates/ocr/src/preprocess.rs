use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKind {
    Original,
    Grayscale,
    Binary(u8),
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantKind::Original => write!(f, "original"),
            VariantKind::Grayscale => write!(f, "grayscale"),
            VariantKind::Binary(t) => write!(f, "binary@{t}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageVariant {
    pub kind: VariantKind,
    pub image: DynamicImage,
}

/// Decode raw image bytes (JPEG / PNG / WEBP / …).
pub fn decode_image(data: &[u8]) -> Result<DynamicImage, PreprocessError> {
    Ok(image::load_from_memory(data)?)
}

pub fn open_image(path: &Path) -> Result<DynamicImage, PreprocessError> {
    Ok(image::open(path)?)
}

/// Derive `[original, grayscale, binary@t…]` from `image`, one binary image per
/// threshold in the given order. The source image is left untouched.
pub fn produce_variants(image: &DynamicImage, thresholds: &[u8]) -> Vec<ImageVariant> {
    let gray = image.to_luma8();

    let binaries = thresholds.iter().map(|&t| ImageVariant {
        kind: VariantKind::Binary(t),
        image: DynamicImage::ImageLuma8(binarize(&gray, t)),
    });
    let binaries: Vec<ImageVariant> = binaries.collect();

    let mut variants = Vec::with_capacity(2 + thresholds.len());
    variants.push(ImageVariant { kind: VariantKind::Original, image: image.clone() });
    variants.push(ImageVariant { kind: VariantKind::Grayscale, image: DynamicImage::ImageLuma8(gray) });
    variants.extend(binaries);
    variants
}

/// Pure white above `threshold`, pure black otherwise.
pub fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] > threshold {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}
