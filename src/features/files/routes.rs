use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;

use crate::features::files::dtos::MAX_FILE_SIZE;
use crate::features::files::handlers::{
    delete_file, download_file, get_download_url, list_files, upload_file,
};
use crate::features::files::services::{FileService, IngestionService};

/// Create routes for the files feature
pub fn routes(file_service: Arc<FileService>, ingestion_service: Arc<IngestionService>) -> Router {
    let upload = Router::new()
        .route(
            "/api/upload",
            // Allow body size up to MAX_FILE_SIZE + buffer for multipart overhead
            axum::routing::post(upload_file)
                .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024)),
        )
        .with_state(ingestion_service);

    Router::new()
        .route("/api/upload", get(list_files))
        .route("/api/files/{id}", axum::routing::delete(delete_file))
        .route("/api/files/{id}/content", get(download_file))
        .route("/api/files/{id}/download-url", get(get_download_url))
        .with_state(file_service)
        .merge(upload)
}
