use image::codecs::jpeg::JpegEncoder;

use super::ImagingError;
use crate::shared::constants::{THUMBNAIL_JPEG_QUALITY, THUMBNAIL_MAX_EDGE};

/// JPEG thumbnail fitting inside a `THUMBNAIL_MAX_EDGE` square.
/// Images already small enough keep their size.
pub fn render_thumbnail(bytes: &[u8]) -> Result<Vec<u8>, ImagingError> {
    let image = image::load_from_memory(bytes).map_err(|e| ImagingError::Decode(e.to_string()))?;

    let fitted = if image.width() > THUMBNAIL_MAX_EDGE || image.height() > THUMBNAIL_MAX_EDGE {
        image.thumbnail(THUMBNAIL_MAX_EDGE, THUMBNAIL_MAX_EDGE)
    } else {
        image
    };

    let mut out = Vec::new();
    fitted
        .to_rgb8()
        .write_with_encoder(JpegEncoder::new_with_quality(&mut out, THUMBNAIL_JPEG_QUALITY))
        .map_err(|e| ImagingError::Encode(e.to_string()))?;

    Ok(out)
}
