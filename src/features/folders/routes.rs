use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::folders::handlers::{create_folder, list_folders};
use crate::features::folders::services::FolderService;

pub fn routes(service: Arc<FolderService>) -> Router {
    Router::new()
        .route("/api/folders", get(list_folders).post(create_folder))
        .with_state(service)
}
