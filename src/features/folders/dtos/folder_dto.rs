use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::folders::models::{Folder, FolderType};

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderDto {
    pub name: Option<String>,
    pub parent_id: Option<Uuid>,
    pub folder_type: Option<FolderType>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FolderListResponseDto {
    pub folders: Vec<Folder>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateFolderResponseDto {
    pub success: bool,
    pub folder: Folder,
}
