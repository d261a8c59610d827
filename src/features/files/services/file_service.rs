use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::ClientInfo;
use crate::features::audit::models::{AuditAction, AuditResource, NewAuditLog};
use crate::features::audit::AuditService;
use crate::features::files::dtos::{DownloadUrlResponseDto, FileListQuery};
use crate::features::files::models::File;
use crate::features::files::repositories::FileRepository;
use crate::modules::storage::{ObjectStore, StorageError};

/// Bytes of a stored file, ready to stream back to its owner
#[derive(Debug)]
pub struct FileContent {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Access to stored files: listing, retrieval and removal
pub struct FileService {
    files: Arc<dyn FileRepository>,
    storage: Arc<dyn ObjectStore>,
    audit: Arc<AuditService>,
    presign_expiry_secs: u32,
}

impl FileService {
    pub fn new(
        files: Arc<dyn FileRepository>,
        storage: Arc<dyn ObjectStore>,
        audit: Arc<AuditService>,
        presign_expiry_secs: u32,
    ) -> Self {
        Self {
            files,
            storage,
            audit,
            presign_expiry_secs,
        }
    }

    async fn find_owned(&self, user_id: Uuid, file_id: Uuid) -> Result<File> {
        self.files
            .find_owned(file_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))
    }

    pub async fn list(&self, user_id: Uuid, query: FileListQuery) -> Result<Vec<File>> {
        self.files.list(user_id, &query).await
    }

    pub async fn download_url(&self, user_id: Uuid, file_id: Uuid) -> Result<DownloadUrlResponseDto> {
        let file = self.find_owned(user_id, file_id).await?;

        let url = self
            .storage
            .presign_get(&file.storage_path, self.presign_expiry_secs)
            .await
            .map_err(|e| {
                tracing::error!("Failed to presign {}: {}", file.storage_path, e);
                AppError::upstream("Failed to create download URL", e.to_string())
            })?;

        Ok(DownloadUrlResponseDto {
            url,
            expires_in: self.presign_expiry_secs,
        })
    }

    /// Fetch the stored object of an owned file
    pub async fn content(&self, user_id: Uuid, file_id: Uuid) -> Result<FileContent> {
        let file = self.find_owned(user_id, file_id).await?;

        let bytes = self
            .storage
            .get(&file.storage_path)
            .await
            .map_err(|e| match e {
                StorageError::NotFound(_) => {
                    tracing::warn!("File {} has no stored object at {}", file.id, file.storage_path);
                    AppError::NotFound("File content not found".to_string())
                }
                e => {
                    tracing::error!("Failed to download {}: {}", file.storage_path, e);
                    AppError::upstream("Failed to download file", e.to_string())
                }
            })?;

        Ok(FileContent {
            file_name: file.download_name(),
            mime_type: file.mime_type,
            bytes,
        })
    }

    /// Remove an owned file: its object first, then the thumbnail and the
    /// record. A failed object delete leaves the record in place.
    pub async fn delete(&self, user_id: Uuid, file_id: Uuid, client: ClientInfo) -> Result<()> {
        let file = self.find_owned(user_id, file_id).await?;

        self.storage
            .delete(&file.storage_path)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete object {}: {}", file.storage_path, e);
                AppError::upstream("Failed to delete file", e.to_string())
            })?;

        if let Some(thumbnail) = file.metadata.thumbnail_key.as_deref() {
            if let Err(e) = self.storage.delete(thumbnail).await {
                tracing::warn!("Failed to delete thumbnail {}: {}", thumbnail, e);
            }
        }

        if !self.files.delete_owned(file.id, user_id).await? {
            return Err(AppError::NotFound("File not found".to_string()));
        }

        tracing::info!("User {} deleted file {} ({})", user_id, file.id, file.storage_path);

        self.audit
            .record(
                NewAuditLog::new(user_id, AuditAction::FileDeleted, AuditResource::File)
                    .resource_id(file.id)
                    .details(json!({
                        "fileName": file.original_name,
                        "displayName": file.display_name,
                    }))
                    .client(client.ip_address, client.user_agent),
            )
            .await;

        Ok(())
    }
}
