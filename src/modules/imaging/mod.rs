//! CPU-bound image work used during ingestion. Callers run these on the
//! blocking pool.

mod edge_crop;
mod pdf;
mod thumbnail;

use thiserror::Error;

pub use edge_crop::crop_document_edges;
pub use pdf::image_to_pdf;
pub use thumbnail::render_thumbnail;

#[derive(Debug, Error)]
pub enum ImagingError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Failed to build PDF: {0}")]
    Pdf(String),
}
