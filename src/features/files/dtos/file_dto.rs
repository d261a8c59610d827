use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::files::models::File;
use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Maximum accepted upload size in bytes
pub const MAX_FILE_SIZE: usize = 20 * 1024 * 1024;

/// Multipart form accepted by `POST /api/upload`.
/// Documentation only; the handler reads the multipart stream directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    #[schema(rename = "folderId")]
    pub folder_id: Option<Uuid>,
    /// Wrap image uploads into a single-page PDF
    #[schema(rename = "convertToPdf", example = "false")]
    pub convert_to_pdf: Option<bool>,
}

/// Query parameters of the file listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FileListParams {
    pub folder_id: Option<Uuid>,
    /// Matches display names (substring) or tags (exact, case-insensitive)
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Owner-independent listing filter with pagination applied
#[derive(Debug, Clone, PartialEq)]
pub struct FileListQuery {
    pub folder_id: Option<Uuid>,
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl From<FileListParams> for FileListQuery {
    fn from(params: FileListParams) -> Self {
        Self {
            folder_id: params.folder_id,
            search: params
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            limit: params
                .limit
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
            offset: params.offset.unwrap_or(0).max(0),
        }
    }
}

impl FileListQuery {
    pub fn recent(limit: i64) -> Self {
        Self {
            folder_id: None,
            search: None,
            limit,
            offset: 0,
        }
    }

    pub fn search(query: &str, limit: i64) -> Self {
        Self {
            search: Some(query.to_string()),
            ..Self::recent(limit)
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileListResponseDto {
    pub files: Vec<File>,
}

/// Summary of a freshly ingested file
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFileDto {
    pub id: Uuid,
    pub display_name: String,
    pub file_type: String,
    pub size: i64,
    pub mime_type: String,
    pub ai_generated_name: bool,
    pub tags: Vec<String>,
    /// True for image uploads stored as images
    pub should_convert_to_pdf: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponseDto {
    pub success: bool,
    pub file: UploadedFileDto,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadUrlResponseDto {
    pub url: String,
    /// Seconds until the URL expires
    pub expires_in: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_defaults() {
        let query = FileListQuery::from(FileListParams::default());

        assert_eq!(query.limit, 50);
        assert_eq!(query.offset, 0);
        assert_eq!(query.search, None);
    }

    #[test]
    fn test_list_limit_is_clamped() {
        let huge = FileListQuery::from(FileListParams {
            limit: Some(1000),
            ..Default::default()
        });
        let zero = FileListQuery::from(FileListParams {
            limit: Some(0),
            offset: Some(-5),
            search: Some("   ".to_string()),
            ..Default::default()
        });

        assert_eq!(huge.limit, 100);
        assert_eq!(zero.limit, 1);
        assert_eq!(zero.offset, 0);
        assert_eq!(zero.search, None);
    }
}
