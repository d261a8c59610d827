//! Model-backed document classification used by file ingestion.

pub mod clients;
pub mod models;
pub mod services;

pub use clients::{ClassificationError, ClassificationInput, DocumentClassifier, OpenAiClassifier};
pub use services::ClassificationService;
