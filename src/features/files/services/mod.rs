mod file_service;
mod ingestion_service;

pub use file_service::FileService;
pub use ingestion_service::{IngestionRequest, IngestionService};
