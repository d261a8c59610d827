use std::sync::Arc;

use crate::features::audit::models::NewAuditLog;
use crate::features::audit::repositories::AuditRepository;

/// Appends audit entries. A failed write is logged and never fails the
/// operation being audited.
pub struct AuditService {
    repository: Arc<dyn AuditRepository>,
}

impl AuditService {
    pub fn new(repository: Arc<dyn AuditRepository>) -> Self {
        Self { repository }
    }

    pub async fn record(&self, entry: NewAuditLog) {
        let action = entry.action.as_str();
        let resource_id = entry.resource_id;

        match self.repository.append(entry).await {
            Ok(log) => tracing::debug!("Audit log {} written for {}", log.id, action),
            Err(e) => tracing::warn!(
                "Failed to write audit log for {} on {:?}: {}",
                action,
                resource_id,
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::audit::models::{AuditAction, AuditResource};
    use crate::shared::test_helpers::InMemoryAuditRepository;
    use serde_json::json;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_record_appends_entry() {
        let repo = Arc::new(InMemoryAuditRepository::default());
        let service = AuditService::new(repo.clone());
        let user_id = Uuid::new_v4();
        let folder_id = Uuid::new_v4();

        service
            .record(
                NewAuditLog::new(user_id, AuditAction::FolderCreated, AuditResource::Folder)
                    .resource_id(folder_id)
                    .details(json!({ "folderName": "Taxes" })),
            )
            .await;

        let entries = repo.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "folder_created");
        assert_eq!(entries[0].resource_id, Some(folder_id));
    }

    #[tokio::test]
    async fn test_record_swallows_write_failure() {
        let repo = Arc::new(InMemoryAuditRepository::failing());
        let service = AuditService::new(repo.clone());

        service
            .record(NewAuditLog::new(
                Uuid::new_v4(),
                AuditAction::FileUploaded,
                AuditResource::File,
            ))
            .await;

        assert!(repo.entries().is_empty());
    }
}
