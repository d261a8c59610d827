use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Action names written to `audit_logs.action`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    FileUploaded,
    FileDeleted,
    FolderCreated,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::FileUploaded => "file_uploaded",
            AuditAction::FileDeleted => "file_deleted",
            AuditAction::FolderCreated => "folder_created",
        }
    }
}

/// Resource kinds written to `audit_logs.resource_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditResource {
    File,
    Folder,
}

impl AuditResource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditResource::File => "file",
            AuditResource::Folder => "folder",
        }
    }
}

/// Stored audit entry. The table is append-only.
#[derive(Debug, Clone, Serialize, FromRow)]
#[allow(dead_code)]
pub struct AuditLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<Uuid>,
    pub details: Option<JsonValue>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data for appending an audit entry
#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub user_id: Uuid,
    pub action: AuditAction,
    pub resource_type: AuditResource,
    pub resource_id: Option<Uuid>,
    pub details: JsonValue,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl NewAuditLog {
    pub fn new(user_id: Uuid, action: AuditAction, resource_type: AuditResource) -> Self {
        Self {
            user_id,
            action,
            resource_type,
            resource_id: None,
            details: JsonValue::Null,
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn resource_id(mut self, id: Uuid) -> Self {
        self.resource_id = Some(id);
        self
    }

    pub fn details(mut self, details: JsonValue) -> Self {
        self.details = details;
        self
    }

    pub fn client(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }
}
