use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::format::file_extension;

/// Processing facts recorded with each stored file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    /// SHA-256 hex of the uploaded bytes
    pub content_hash: String,
    pub confidence: f64,
    pub original_size: i64,
    pub processed_size: i64,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_key: Option<String>,
    #[serde(default)]
    pub cropped: bool,
    #[serde(default)]
    pub converted_to_pdf: bool,
}

/// Stored vault file
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub id: Uuid,
    pub user_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub original_name: String,
    pub display_name: String,
    /// Detected document type, e.g. "Invoice"
    pub file_type: String,
    pub file_size: i64,
    pub mime_type: String,
    pub storage_path: String,
    #[serde(skip_serializing, default)]
    pub encrypted_key: String,
    pub ai_generated_name: bool,
    pub tags: Vec<String>,
    #[schema(value_type = FileMetadata)]
    pub metadata: Json<FileMetadata>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl File {
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// Display name carrying the stored object's extension, e.g. `Lease.pdf`
    pub fn download_name(&self) -> String {
        match file_extension(&self.storage_path) {
            Some(ext) => format!("{}.{}", self.display_name, ext),
            None => self.display_name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewFile {
    pub user_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub original_name: String,
    pub display_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub mime_type: String,
    pub storage_path: String,
    pub encrypted_key: String,
    pub ai_generated_name: bool,
    pub tags: Vec<String>,
    pub metadata: FileMetadata,
}

#[cfg(test)]
mod tests {
    use crate::shared::test_helpers::sample_file;
    use uuid::Uuid;

    #[test]
    fn test_download_name_uses_stored_extension() {
        let mut file = sample_file(Uuid::new_v4(), "Lease Agreement");
        assert_eq!(file.download_name(), "Lease Agreement.pdf");

        file.storage_path = "users/u/files/1700000000000-abcd1234".to_string();
        assert_eq!(file.download_name(), "Lease Agreement");
    }
}
