use serde_json::json;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::core::extractor::ClientInfo;
use crate::features::audit::models::{AuditAction, AuditResource, NewAuditLog};
use crate::features::audit::AuditService;
use crate::features::folders::dtos::CreateFolderDto;
use crate::features::folders::models::{Folder, NewFolder};
use crate::features::folders::repositories::FolderRepository;
use uuid::Uuid;

pub struct FolderService {
    folders: Arc<dyn FolderRepository>,
    audit: Arc<AuditService>,
}

impl FolderService {
    pub fn new(folders: Arc<dyn FolderRepository>, audit: Arc<AuditService>) -> Self {
        Self { folders, audit }
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Folder>> {
        self.folders.list_by_user(user_id).await
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        dto: CreateFolderDto,
        client: ClientInfo,
    ) -> Result<Folder> {
        let name = dto
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::Validation("Folder name is required".to_string()))?
            .to_string();

        if let Some(parent_id) = dto.parent_id {
            if self.folders.find_owned(parent_id, user_id).await?.is_none() {
                return Err(AppError::BadRequest("Parent folder not found".to_string()));
            }
        }

        let folder = self
            .folders
            .create(NewFolder {
                user_id,
                name,
                parent_id: dto.parent_id,
                folder_type: dto.folder_type.unwrap_or_default(),
            })
            .await?;

        tracing::info!("User {} created folder {}", user_id, folder.id);

        self.audit
            .record(
                NewAuditLog::new(user_id, AuditAction::FolderCreated, AuditResource::Folder)
                    .resource_id(folder.id)
                    .details(json!({
                        "folderName": folder.name,
                        "folderType": folder.folder_type.as_str(),
                    }))
                    .client(client.ip_address, client.user_agent),
            )
            .await;

        Ok(folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::folders::models::FolderType;
    use crate::shared::test_helpers::{InMemoryAuditRepository, InMemoryFolderRepository};

    fn service(
        folders: Arc<InMemoryFolderRepository>,
        audit: Arc<InMemoryAuditRepository>,
    ) -> FolderService {
        FolderService::new(folders, Arc::new(AuditService::new(audit)))
    }

    fn named(name: &str) -> CreateFolderDto {
        CreateFolderDto {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_trims_name_and_defaults_type() {
        let folders = Arc::new(InMemoryFolderRepository::default());
        let audit = Arc::new(InMemoryAuditRepository::default());
        let user_id = Uuid::new_v4();

        let folder = service(folders.clone(), audit.clone())
            .create(user_id, named("  Taxes 2024 "), ClientInfo::default())
            .await
            .unwrap();

        assert_eq!(folder.name, "Taxes 2024");
        assert_eq!(folder.folder_type, FolderType::Custom);
        assert_eq!(folders.all().len(), 1);

        let entries = audit.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "folder_created");
        let details = entries[0].details.as_ref().unwrap();
        assert_eq!(details["folderName"], "Taxes 2024");
        assert_eq!(details["folderType"], "custom");
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected_without_insert() {
        let folders = Arc::new(InMemoryFolderRepository::default());
        let audit = Arc::new(InMemoryAuditRepository::default());

        let result = service(folders.clone(), audit.clone())
            .create(Uuid::new_v4(), named("   "), ClientInfo::default())
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(folders.all().is_empty());
        assert!(audit.entries().is_empty());
    }

    #[tokio::test]
    async fn test_parent_must_belong_to_caller() {
        let folders = Arc::new(InMemoryFolderRepository::default());
        let svc = service(folders.clone(), Arc::new(InMemoryAuditRepository::default()));
        let owner = Uuid::new_v4();
        let parent = svc
            .create(owner, named("Company"), ClientInfo::default())
            .await
            .unwrap();

        let mut dto = named("Stolen");
        dto.parent_id = Some(parent.id);
        let result = svc
            .create(Uuid::new_v4(), dto.clone(), ClientInfo::default())
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let child = svc.create(owner, dto, ClientInfo::default()).await.unwrap();
        assert_eq!(child.parent_id, Some(parent.id));
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_fail_create() {
        let folders = Arc::new(InMemoryFolderRepository::default());
        let audit = Arc::new(InMemoryAuditRepository::failing());

        let result = service(folders, audit)
            .create(Uuid::new_v4(), named("Receipts"), ClientInfo::default())
            .await;

        assert!(result.is_ok());
    }
}
