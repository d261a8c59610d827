//! Crops scanned documents to the region containing detected edges.

use image::{codecs::jpeg::JpegEncoder, DynamicImage, GrayImage, ImageFormat, Luma};
use std::io::Cursor;

use super::ImagingError;
use crate::shared::constants::CROP_JPEG_QUALITY;

/// 3x3 high-pass kernel, row major
const EDGE_KERNEL: [i32; 9] = [-1, -1, -1, -1, 8, -1, -1, -1, -1];

const EDGE_THRESHOLD: u8 = 128;

/// Minimum box side as a fraction of the smaller image dimension
const MIN_EDGE_RATIO: f64 = 0.1;

/// Inclusive pixel bounds of detected edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeBounds {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl EdgeBounds {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

/// Best-effort crop. Returns the crop encoded in the input's format, or the
/// input bytes untouched when no usable document boundary is found or
/// anything fails.
pub fn crop_document_edges(bytes: &[u8]) -> Vec<u8> {
    match try_crop(bytes) {
        Ok(Some(cropped)) => cropped,
        Ok(None) => bytes.to_vec(),
        Err(e) => {
            tracing::warn!("Edge crop skipped: {}", e);
            bytes.to_vec()
        }
    }
}

fn try_crop(bytes: &[u8]) -> Result<Option<Vec<u8>>, ImagingError> {
    let format = image::guess_format(bytes).map_err(|e| ImagingError::Decode(e.to_string()))?;
    let image = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImagingError::Decode(e.to_string()))?;

    let edges = detect_edges(&image.to_luma8());
    let Some(bounds) = find_document_bounds(&edges) else {
        tracing::debug!("No document boundary detected, keeping original image");
        return Ok(None);
    };

    tracing::debug!(
        "Cropping {}x{} image to {}x{} at ({}, {})",
        image.width(),
        image.height(),
        bounds.width(),
        bounds.height(),
        bounds.left,
        bounds.top
    );

    let cropped = image.crop_imm(bounds.left, bounds.top, bounds.width(), bounds.height());
    encode_as(&cropped, format).map(Some)
}

fn encode_as(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, ImagingError> {
    let mut out = Vec::new();
    let written = match format {
        ImageFormat::Jpeg => image
            .to_rgb8()
            .write_with_encoder(JpegEncoder::new_with_quality(&mut out, CROP_JPEG_QUALITY)),
        other => image.write_to(&mut Cursor::new(&mut out), other),
    };
    written.map_err(|e| ImagingError::Encode(e.to_string()))?;

    Ok(out)
}

/// Linear contrast stretch of the luma range onto 0..=255
fn normalize(gray: &GrayImage) -> GrayImage {
    let (min, max) = gray
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));

    if max <= min {
        return gray.clone();
    }

    let range = f32::from(max - min);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = f32::from(gray.get_pixel(x, y)[0] - min);
        Luma([(v * 255.0 / range).round() as u8])
    })
}

/// Normalize, convolve with the high-pass kernel and binarize at 128.
/// Out-of-range neighbours replicate the nearest border pixel.
pub fn detect_edges(gray: &GrayImage) -> GrayImage {
    let normalized = normalize(gray);
    let (width, height) = normalized.dimensions();
    let max_x = width as i64 - 1;
    let max_y = height as i64 - 1;

    GrayImage::from_fn(width, height, |x, y| {
        let mut acc = 0i32;
        for (i, weight) in EDGE_KERNEL.iter().enumerate() {
            let dx = (i % 3) as i64 - 1;
            let dy = (i / 3) as i64 - 1;
            let nx = (x as i64 + dx).clamp(0, max_x) as u32;
            let ny = (y as i64 + dy).clamp(0, max_y) as u32;
            acc += weight * i32::from(normalized.get_pixel(nx, ny)[0]);
        }

        let value = acc.clamp(0, 255) as u8;
        Luma([if value >= EDGE_THRESHOLD { 255 } else { 0 }])
    })
}

/// Bounding box of edge pixels, or `None` when it is narrower or shorter than
/// 10% of the smaller image dimension.
pub fn find_document_bounds(edges: &GrayImage) -> Option<EdgeBounds> {
    let (width, height) = edges.dimensions();
    let min_edge = f64::from(width.min(height)) * MIN_EDGE_RATIO;

    let mut bounds: Option<EdgeBounds> = None;
    for (x, y, pixel) in edges.enumerate_pixels() {
        if pixel[0] <= EDGE_THRESHOLD {
            continue;
        }
        bounds = Some(match bounds {
            None => EdgeBounds {
                left: x,
                top: y,
                right: x,
                bottom: y,
            },
            Some(b) => EdgeBounds {
                left: b.left.min(x),
                top: b.top.min(y),
                right: b.right.max(x),
                bottom: b.bottom.max(y),
            },
        });
    }

    bounds.filter(|b| {
        b.width() > 0
            && b.height() > 0
            && f64::from(b.width()) >= min_edge
            && f64::from(b.height()) >= min_edge
    })
}
