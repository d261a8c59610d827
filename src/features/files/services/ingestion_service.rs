use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::ClientInfo;
use crate::features::audit::models::{AuditAction, AuditResource, NewAuditLog};
use crate::features::audit::AuditService;
use crate::features::classification::models::DocumentClassification;
use crate::features::classification::{ClassificationInput, ClassificationService};
use crate::features::files::dtos::UploadedFileDto;
use crate::features::files::models::{FileMetadata, NewFile};
use crate::features::files::repositories::FileRepository;
use crate::features::folders::FolderRepository;
use crate::modules::imaging::{crop_document_edges, image_to_pdf, render_thumbnail};
use crate::modules::storage::{thumbnail_key, ObjectMetadata, ObjectStore};
use crate::shared::constants::{AI_NAME_CONFIDENCE_THRESHOLD, UNTITLED_DOCUMENT};
use crate::shared::format::{file_extension, file_stem};

const PDF_MIME_TYPE: &str = "application/pdf";
const THUMBNAIL_MIME_TYPE: &str = "image/jpeg";
const DEFAULT_EXTENSION: &str = "bin";

/// An upload waiting to be ingested
#[derive(Debug, Clone)]
pub struct IngestionRequest {
    pub user_id: Uuid,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub folder_id: Option<Uuid>,
    pub convert_to_pdf: bool,
    pub client: ClientInfo,
}

/// Bytes that will be stored, after optional crop and PDF conversion
struct ProcessedUpload {
    bytes: Vec<u8>,
    mime_type: String,
    extension: String,
    cropped: bool,
    converted_to_pdf: bool,
    /// Image the thumbnail is rendered from
    preview: Option<Vec<u8>>,
}

/// Hex SHA-256 of `bytes`
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Opaque per-file token: hex HMAC-SHA256 of the content hash under the vault secret
pub fn key_token(secret: &str, content_hash: &str) -> Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("Invalid vault key: {}", e)))?;
    mac.update(content_hash.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// `users/<user>/files/<unix millis>-<hash prefix>.<ext>`
pub fn storage_key(user_id: Uuid, uploaded_at_millis: i64, content_hash: &str, extension: &str) -> String {
    let prefix = content_hash.get(..8).unwrap_or(content_hash);
    format!(
        "users/{}/files/{}-{}.{}",
        user_id, uploaded_at_millis, prefix, extension
    )
}

/// Suggested name, then filename stem, then a fixed placeholder
pub fn display_name(classification: &DocumentClassification, file_name: &str) -> String {
    [classification.suggested_name.as_str(), file_stem(file_name)]
        .into_iter()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .unwrap_or(UNTITLED_DOCUMENT)
        .to_string()
}

/// Turns raw uploads into stored, classified vault files
pub struct IngestionService {
    classification: Arc<ClassificationService>,
    storage: Arc<dyn ObjectStore>,
    files: Arc<dyn FileRepository>,
    folders: Arc<dyn FolderRepository>,
    audit: Arc<AuditService>,
    key_secret: String,
}

impl IngestionService {
    pub fn new(
        classification: Arc<ClassificationService>,
        storage: Arc<dyn ObjectStore>,
        files: Arc<dyn FileRepository>,
        folders: Arc<dyn FolderRepository>,
        audit: Arc<AuditService>,
        key_secret: String,
    ) -> Self {
        Self {
            classification,
            storage,
            files,
            folders,
            audit,
            key_secret,
        }
    }

    pub async fn ingest(&self, request: IngestionRequest) -> Result<UploadedFileDto> {
        if request.bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }

        if let Some(folder_id) = request.folder_id {
            if self
                .folders
                .find_owned(folder_id, request.user_id)
                .await?
                .is_none()
            {
                return Err(AppError::BadRequest("Folder not found".to_string()));
            }
        }

        let hash = content_hash(&request.bytes);
        let is_image = request.mime_type.starts_with("image/");

        let classification = self
            .classification
            .classify(ClassificationInput {
                file_name: &request.file_name,
                mime_type: &request.mime_type,
                bytes: &request.bytes,
            })
            .await;

        let mut processed = self.process(&request, is_image).await;

        let uploaded_at = Utc::now();
        let key = storage_key(
            request.user_id,
            uploaded_at.timestamp_millis(),
            &hash,
            &processed.extension,
        );
        let token = key_token(&self.key_secret, &hash)?;

        let processed_size = processed.bytes.len() as i64;
        let preview = processed.preview.take();
        let object_metadata = ObjectMetadata::for_file(request.user_id, &hash);

        self.storage
            .put(&key, processed.bytes, &processed.mime_type, &object_metadata)
            .await
            .map_err(|e| {
                tracing::error!("Failed to store {}: {}", key, e);
                AppError::upstream("Failed to upload file", e.to_string())
            })?;

        let thumbnail = match preview {
            Some(source) => {
                self.store_thumbnail(&key, source, &object_metadata.thumbnail())
                    .await
            }
            None => None,
        };

        let display_name = display_name(&classification, &request.file_name);
        let confidence = classification.confidence;

        let new_file = NewFile {
            user_id: request.user_id,
            folder_id: request.folder_id,
            original_name: request.file_name.clone(),
            display_name,
            file_type: classification.document_type,
            file_size: processed_size,
            mime_type: processed.mime_type,
            storage_path: key,
            encrypted_key: token,
            ai_generated_name: confidence > AI_NAME_CONFIDENCE_THRESHOLD,
            tags: classification.tags,
            metadata: FileMetadata {
                content_hash: hash,
                confidence,
                original_size: request.bytes.len() as i64,
                processed_size,
                uploaded_at,
                thumbnail_key: thumbnail,
                cropped: processed.cropped,
                converted_to_pdf: processed.converted_to_pdf,
            },
        };

        let file = self.files.create(new_file).await.map_err(|e| {
            tracing::error!(
                "Failed to save metadata for {} (object left in storage): {}",
                request.file_name,
                e
            );
            AppError::upstream_without_details("Failed to save file metadata")
        })?;

        tracing::info!(
            "User {} uploaded {} as {} ({})",
            request.user_id,
            request.file_name,
            file.id,
            file.file_type
        );

        self.audit
            .record(
                NewAuditLog::new(request.user_id, AuditAction::FileUploaded, AuditResource::File)
                    .resource_id(file.id)
                    .details(json!({
                        "fileName": file.original_name,
                        "displayName": file.display_name,
                        "fileType": file.file_type,
                        "fileSize": file.file_size,
                    }))
                    .client(request.client.ip_address, request.client.user_agent),
            )
            .await;

        Ok(UploadedFileDto {
            id: file.id,
            display_name: file.display_name,
            file_type: file.file_type,
            size: file.file_size,
            mime_type: file.mime_type,
            ai_generated_name: file.ai_generated_name,
            tags: file.tags,
            should_convert_to_pdf: is_image && !processed.converted_to_pdf,
            created_at: file.created_at,
        })
    }

    async fn process(&self, request: &IngestionRequest, is_image: bool) -> ProcessedUpload {
        let extension =
            file_extension(&request.file_name).unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

        if !is_image {
            return ProcessedUpload {
                bytes: request.bytes.clone(),
                mime_type: request.mime_type.clone(),
                extension,
                cropped: false,
                converted_to_pdf: false,
                preview: None,
            };
        }

        let original = request.bytes.clone();
        let bytes = match tokio::task::spawn_blocking(move || crop_document_edges(&original)).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Edge crop task failed: {}", e);
                request.bytes.clone()
            }
        };
        let cropped = bytes != request.bytes;

        if request.convert_to_pdf {
            let image = bytes.clone();
            match tokio::task::spawn_blocking(move || image_to_pdf(&image)).await {
                Ok(Ok(pdf)) => {
                    return ProcessedUpload {
                        bytes: pdf,
                        mime_type: PDF_MIME_TYPE.to_string(),
                        extension: "pdf".to_string(),
                        cropped,
                        converted_to_pdf: true,
                        preview: Some(bytes),
                    };
                }
                Ok(Err(e)) => tracing::warn!("PDF conversion of {} failed: {}", request.file_name, e),
                Err(e) => tracing::warn!("PDF conversion task failed: {}", e),
            }
        }

        ProcessedUpload {
            preview: Some(bytes.clone()),
            bytes,
            mime_type: request.mime_type.clone(),
            extension,
            cropped,
            converted_to_pdf: false,
        }
    }

    /// Store a thumbnail beside `key`. Failures are logged and yield `None`.
    async fn store_thumbnail(
        &self,
        key: &str,
        image: Vec<u8>,
        metadata: &ObjectMetadata,
    ) -> Option<String> {
        let thumbnail = match tokio::task::spawn_blocking(move || render_thumbnail(&image)).await {
            Ok(Ok(thumbnail)) => thumbnail,
            Ok(Err(e)) => {
                tracing::warn!("Thumbnail for {} skipped: {}", key, e);
                return None;
            }
            Err(e) => {
                tracing::warn!("Thumbnail task failed: {}", e);
                return None;
            }
        };

        let thumb_key = thumbnail_key(key);
        match self
            .storage
            .put(&thumb_key, thumbnail, THUMBNAIL_MIME_TYPE, metadata)
            .await
        {
            Ok(()) => Some(thumb_key),
            Err(e) => {
                tracing::warn!("Failed to store thumbnail {}: {}", thumb_key, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::classification::models::ClassificationReply;
    use crate::features::files::dtos::FileListQuery;
    use crate::features::folders::models::{FolderType, NewFolder};
    use crate::shared::test_helpers::{
        png_bytes, FakeClassifier, InMemoryAuditRepository, InMemoryFileRepository,
        InMemoryFolderRepository, InMemoryObjectStore,
    };
    use regex::Regex;

    struct Harness {
        service: IngestionService,
        storage: Arc<InMemoryObjectStore>,
        files: Arc<InMemoryFileRepository>,
        folders: Arc<InMemoryFolderRepository>,
        audit: Arc<InMemoryAuditRepository>,
    }

    fn harness_with(classifier: FakeClassifier, storage: InMemoryObjectStore) -> Harness {
        let storage = Arc::new(storage);
        let files = Arc::new(InMemoryFileRepository::default());
        let folders = Arc::new(InMemoryFolderRepository::default());
        let audit = Arc::new(InMemoryAuditRepository::default());
        let service = IngestionService::new(
            Arc::new(ClassificationService::new(Arc::new(classifier))),
            storage.clone(),
            files.clone(),
            folders.clone(),
            Arc::new(AuditService::new(audit.clone())),
            "test-vault-secret".to_string(),
        );
        Harness {
            service,
            storage,
            files,
            folders,
            audit,
        }
    }

    fn harness(classifier: FakeClassifier) -> Harness {
        harness_with(classifier, InMemoryObjectStore::default())
    }

    fn pdf_request(user_id: Uuid) -> IngestionRequest {
        IngestionRequest {
            user_id,
            file_name: "Scan 2024.PDF".to_string(),
            mime_type: "application/pdf".to_string(),
            bytes: b"%PDF-1.4 test document".to_vec(),
            folder_id: None,
            convert_to_pdf: false,
            client: ClientInfo {
                ip_address: Some("203.0.113.7".to_string()),
                user_agent: Some("tests".to_string()),
            },
        }
    }

    fn invoice_reply(confidence: f64) -> ClassificationReply {
        ClassificationReply {
            document_type: Some("Invoice".to_string()),
            confidence: Some(confidence),
            suggested_name: Some("Acme Invoice".to_string()),
            tags: vec!["finance".to_string()],
        }
    }

    #[test]
    fn test_storage_key_shape() {
        let hash = content_hash(b"hello");
        let key = storage_key(Uuid::nil(), 1_700_000_000_000, &hash, "pdf");

        assert_eq!(
            key,
            format!("users/{}/files/1700000000000-{}.pdf", Uuid::nil(), &hash[..8])
        );
    }

    #[test]
    fn test_key_token_is_deterministic_hmac() {
        let hash = content_hash(b"hello");

        let a = key_token("secret", &hash).unwrap();
        let b = key_token("secret", &hash).unwrap();
        let c = key_token("other", &hash).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut classification = DocumentClassification::fallback("notes.txt");
        assert_eq!(display_name(&classification, "notes.txt"), "notes");

        classification.suggested_name = "  ".to_string();
        assert_eq!(display_name(&classification, ".txt"), ".txt");
        assert_eq!(display_name(&classification, ""), UNTITLED_DOCUMENT);
    }

    #[tokio::test]
    async fn test_pdf_upload_is_stored_and_recorded() {
        let h = harness(FakeClassifier::replying(invoice_reply(0.9)));
        let user_id = Uuid::new_v4();

        let uploaded = h.service.ingest(pdf_request(user_id)).await.unwrap();

        assert_eq!(uploaded.display_name, "Acme Invoice");
        assert_eq!(uploaded.file_type, "Invoice");
        assert!(uploaded.ai_generated_name);
        assert!(!uploaded.should_convert_to_pdf);

        let stored = h.files.list_all();
        assert_eq!(stored.len(), 1);
        let key_pattern = Regex::new(&format!(
            r"^users/{}/files/\d+-[0-9a-f]{{8}}\.pdf$",
            user_id
        ))
        .unwrap();
        assert!(key_pattern.is_match(&stored[0].storage_path));
        assert_eq!(stored[0].metadata.content_hash, content_hash(b"%PDF-1.4 test document"));
        assert!(h.storage.contains(&stored[0].storage_path));
        assert_eq!(h.storage.len(), 1);
        let object_metadata = h.storage.metadata(&stored[0].storage_path).unwrap();
        assert_eq!(object_metadata.user_id, user_id);
        assert_eq!(object_metadata.file_hash, stored[0].metadata.content_hash);
        assert!(!object_metadata.is_thumbnail);

        let entries = h.audit.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "file_uploaded");
        assert_eq!(entries[0].ip_address.as_deref(), Some("203.0.113.7"));
    }

    #[tokio::test]
    async fn test_classifier_failure_uses_fallback() {
        let h = harness(FakeClassifier::failing());

        let uploaded = h.service.ingest(pdf_request(Uuid::new_v4())).await.unwrap();

        assert_eq!(uploaded.display_name, "Scan 2024");
        assert_eq!(uploaded.file_type, "Unknown Document");
        assert!(!uploaded.ai_generated_name);
        assert!(uploaded.tags.is_empty());
        assert_eq!(h.files.list_all()[0].metadata.confidence, 0.1);
    }

    #[tokio::test]
    async fn test_confidence_at_threshold_is_not_ai_named() {
        let h = harness(FakeClassifier::replying(invoice_reply(0.7)));

        let uploaded = h.service.ingest(pdf_request(Uuid::new_v4())).await.unwrap();

        assert!(!uploaded.ai_generated_name);
    }

    #[tokio::test]
    async fn test_image_upload_stores_thumbnail() {
        let h = harness(FakeClassifier::failing());
        let mut request = pdf_request(Uuid::new_v4());
        request.file_name = "receipt.png".to_string();
        request.mime_type = "image/png".to_string();
        request.bytes = png_bytes(400, 300);

        let uploaded = h.service.ingest(request).await.unwrap();

        assert!(uploaded.should_convert_to_pdf);
        let stored = &h.files.list_all()[0];
        assert!(stored.storage_path.ends_with(".png"));
        let thumb = stored.metadata.thumbnail_key.clone().unwrap();
        assert!(thumb.ends_with("_thumb.jpg"));
        assert!(h.storage.contains(&thumb));
        assert!(h.storage.metadata(&thumb).unwrap().is_thumbnail);
        assert!(!h.storage.metadata(&stored.storage_path).unwrap().is_thumbnail);
    }

    #[tokio::test]
    async fn test_image_converted_to_pdf() {
        let h = harness(FakeClassifier::failing());
        let mut request = pdf_request(Uuid::new_v4());
        request.file_name = "id-card.png".to_string();
        request.mime_type = "image/png".to_string();
        request.bytes = png_bytes(120, 80);
        request.convert_to_pdf = true;

        let uploaded = h.service.ingest(request).await.unwrap();

        assert_eq!(uploaded.mime_type, "application/pdf");
        assert!(!uploaded.should_convert_to_pdf);
        let stored = &h.files.list_all()[0];
        assert!(stored.storage_path.ends_with(".pdf"));
        assert!(stored.metadata.converted_to_pdf);
    }

    #[tokio::test]
    async fn test_storage_failure_aborts_without_record() {
        let h = harness_with(FakeClassifier::failing(), InMemoryObjectStore::failing());

        let result = h.service.ingest(pdf_request(Uuid::new_v4())).await;

        match result {
            Err(AppError::Upstream { message, details }) => {
                assert_eq!(message, "Failed to upload file");
                assert!(details.is_some());
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
        assert!(h.files.list_all().is_empty());
        assert!(h.audit.entries().is_empty());
    }

    #[tokio::test]
    async fn test_metadata_failure_keeps_object() {
        let h = harness(FakeClassifier::failing());
        h.files.fail_inserts();

        let result = h.service.ingest(pdf_request(Uuid::new_v4())).await;

        assert!(matches!(
            result,
            Err(AppError::Upstream { ref message, details: None }) if message == "Failed to save file metadata"
        ));
        assert_eq!(h.storage.len(), 1);
    }

    #[tokio::test]
    async fn test_folder_must_be_owned() {
        let h = harness(FakeClassifier::failing());
        let owner = Uuid::new_v4();
        let folder = h
            .folders
            .insert(NewFolder {
                user_id: owner,
                name: "Contracts".to_string(),
                parent_id: None,
                folder_type: FolderType::Custom,
            });

        let mut foreign = pdf_request(Uuid::new_v4());
        foreign.folder_id = Some(folder.id);
        assert!(matches!(
            h.service.ingest(foreign).await,
            Err(AppError::BadRequest(_))
        ));

        let mut own = pdf_request(owner);
        own.folder_id = Some(folder.id);
        h.service.ingest(own).await.unwrap();

        let listed = h
            .files
            .list(owner, &FileListQuery::recent(10))
            .await
            .unwrap();
        assert_eq!(listed[0].folder_id, Some(folder.id));
    }

    #[tokio::test]
    async fn test_identical_uploads_are_not_deduplicated() {
        let h = harness(FakeClassifier::failing());
        let user_id = Uuid::new_v4();

        h.service.ingest(pdf_request(user_id)).await.unwrap();
        h.service.ingest(pdf_request(user_id)).await.unwrap();

        assert_eq!(h.files.list_all().len(), 2);
    }
}
