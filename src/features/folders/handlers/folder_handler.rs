use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, ClientInfo};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::folders::dtos::{
    CreateFolderDto, CreateFolderResponseDto, FolderListResponseDto,
};
use crate::features::folders::services::FolderService;
use crate::shared::types::ErrorResponse;

/// List the caller's folders, oldest first
#[utoipa::path(
    get,
    path = "/api/folders",
    tag = "folders",
    responses(
        (status = 200, description = "Folders of the current user", body = FolderListResponseDto),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_folders(
    user: AuthenticatedUser,
    State(service): State<Arc<FolderService>>,
) -> Result<Json<FolderListResponseDto>> {
    let folders = service.list(user.id).await?;
    Ok(Json(FolderListResponseDto { folders }))
}

/// Create a folder, optionally under a parent owned by the caller
#[utoipa::path(
    post,
    path = "/api/folders",
    tag = "folders",
    request_body = CreateFolderDto,
    responses(
        (status = 200, description = "Folder created", body = CreateFolderResponseDto),
        (status = 400, description = "Missing name or unknown parent", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_folder(
    user: AuthenticatedUser,
    client: ClientInfo,
    State(service): State<Arc<FolderService>>,
    AppJson(dto): AppJson<CreateFolderDto>,
) -> Result<Json<CreateFolderResponseDto>> {
    let folder = service.create(user.id, dto, client).await?;
    Ok(Json(CreateFolderResponseDto {
        success: true,
        folder,
    }))
}
