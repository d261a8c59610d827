use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Folder kind matching the `folder_type` database enum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "folder_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FolderType {
    #[default]
    Custom,
    Founder,
}

impl FolderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FolderType::Custom => "custom",
            FolderType::Founder => "founder",
        }
    }
}

/// Folder in a user's tree. Root folders have no parent.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub folder_type: FolderType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFolder {
    pub user_id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub folder_type: FolderType,
}
