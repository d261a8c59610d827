use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::ClientInfo;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{
    DownloadUrlResponseDto, FileListParams, FileListResponseDto, UploadFileDto,
    UploadResponseDto, MAX_FILE_SIZE,
};
use crate::features::files::services::{FileService, IngestionRequest, IngestionService};
use crate::shared::types::{ErrorResponse, SuccessResponse};

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

fn truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

/// `attachment` disposition with a header-safe file name
fn content_disposition(file_name: &str) -> HeaderValue {
    let safe: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect();

    HeaderValue::try_from(format!("attachment; filename=\"{}\"", safe))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// Upload a document into the vault
///
/// Accepts multipart/form-data with:
/// - `file`: the document (required)
/// - `folderId`: target folder owned by the caller (optional)
/// - `convertToPdf`: wrap image uploads into a PDF (optional)
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 200, description = "File stored and classified", body = UploadResponseDto),
        (status = 400, description = "No file provided or invalid form", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Storage or metadata failure", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_file(
    user: AuthenticatedUser,
    client: ClientInfo,
    State(service): State<Arc<IngestionService>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponseDto>> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut folder_id: Option<Uuid> = None;
    let mut convert_to_pdf = false;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
                let file_name = field.file_name().unwrap_or("").to_string();

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                file = Some((file_name, content_type, data.to_vec()));
            }
            "folderId" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read folderId field: {}", e))
                })?;
                let text = text.trim();
                if !text.is_empty() {
                    folder_id = Some(
                        Uuid::parse_str(text)
                            .map_err(|_| AppError::BadRequest("Invalid folderId".to_string()))?,
                    );
                }
            }
            "convertToPdf" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read convertToPdf field: {}", e))
                })?;
                convert_to_pdf = truthy(&text);
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let (file_name, mime_type, bytes) =
        file.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;

    if bytes.len() > MAX_FILE_SIZE {
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size is {} MB",
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    let uploaded = service
        .ingest(IngestionRequest {
            user_id: user.id,
            file_name,
            mime_type,
            bytes,
            folder_id,
            convert_to_pdf,
            client,
        })
        .await?;

    Ok(Json(UploadResponseDto {
        success: true,
        file: uploaded,
    }))
}

/// List the caller's files, newest first
#[utoipa::path(
    get,
    path = "/api/upload",
    tag = "files",
    params(FileListParams),
    responses(
        (status = 200, description = "Files of the current user", body = FileListResponseDto),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_files(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Query(params): Query<FileListParams>,
) -> Result<Json<FileListResponseDto>> {
    let files = service.list(user.id, params.into()).await?;
    Ok(Json(FileListResponseDto { files }))
}

/// Presigned download URL for one of the caller's files
#[utoipa::path(
    get,
    path = "/api/files/{id}/download-url",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File id")
    ),
    responses(
        (status = 200, description = "Presigned URL", body = DownloadUrlResponseDto),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_download_url(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DownloadUrlResponseDto>> {
    let response = service.download_url(user.id, id).await?;
    Ok(Json(response))
}

/// Download the bytes of one of the caller's files
#[utoipa::path(
    get,
    path = "/api/files/{id}/content",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File id")
    ),
    responses(
        (status = 200, description = "File bytes with the stored content type", content_type = "application/octet-stream", body = Vec<u8>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn download_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let content = service.content(user.id, id).await?;

    let content_type = HeaderValue::try_from(content.mime_type.as_str())
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_MIME_TYPE));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, content_disposition(&content.file_name)),
        ],
        content.bytes,
    )
        .into_response())
}

/// Delete one of the caller's files together with its stored object
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File id")
    ),
    responses(
        (status = 200, description = "File deleted", body = SuccessResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_file(
    user: AuthenticatedUser,
    client: ClientInfo,
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>> {
    service.delete(user.id, id, client).await?;
    Ok(Json(SuccessResponse::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthy() {
        assert!(truthy("true"));
        assert!(truthy(" TRUE "));
        assert!(truthy("1"));
        assert!(!truthy("false"));
        assert!(!truthy(""));
    }

    #[test]
    fn test_content_disposition_is_header_safe() {
        assert_eq!(
            content_disposition("Lease Agreement.pdf"),
            "attachment; filename=\"Lease Agreement.pdf\""
        );
        assert_eq!(
            content_disposition("Re\"ceipt café.png"),
            "attachment; filename=\"Re_ceipt caf_.png\""
        );
    }
}
