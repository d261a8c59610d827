//! S3 storage client
//!
//! Works against AWS S3 or any S3-compatible service (MinIO, R2) when a
//! custom endpoint is configured. Uses the rust-s3 crate.

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use s3::creds::Credentials;
use s3::{Bucket, Region};
use tracing::{debug, info};

use super::object_store::{ObjectMetadata, ObjectStore, StorageError};
use crate::core::config::StorageConfig;

const SERVER_SIDE_ENCRYPTION_HEADER: &str = "x-amz-server-side-encryption";
const SERVER_SIDE_ENCRYPTION: &str = "AES256";
const USER_METADATA_PREFIX: &str = "x-amz-meta-";

pub struct S3ObjectStore {
    bucket: Box<Bucket>,
}

impl S3ObjectStore {
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Config(format!("invalid credentials: {}", e)))?;

        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse::<Region>()
                .map_err(|e| StorageError::Config(format!("invalid region: {}", e)))?,
        };

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| StorageError::Config(format!("invalid bucket: {}", e)))?;

        // S3-compatible services are addressed as http://endpoint/bucket
        if config.endpoint.is_some() {
            bucket.set_path_style();
        }

        info!(
            "S3 client initialized for bucket: {} (endpoint: {})",
            bucket.name(),
            config.endpoint.as_deref().unwrap_or("aws")
        );

        Ok(Self { bucket })
    }

    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Extra PUT headers: SSE-S3 encryption plus the object's user metadata
fn upload_headers(metadata: &ObjectMetadata) -> Result<HeaderMap, String> {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(SERVER_SIDE_ENCRYPTION_HEADER),
        HeaderValue::from_static(SERVER_SIDE_ENCRYPTION),
    );

    for (name, value) in metadata.entries() {
        let name = HeaderName::try_from(format!("{}{}", USER_METADATA_PREFIX, name))
            .map_err(|e| format!("invalid metadata name {}: {}", name, e))?;
        let value = HeaderValue::try_from(value.as_str())
            .map_err(|e| format!("invalid metadata value for {}: {}", name.as_str(), e))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> Result<(), StorageError> {
        let upload_error = |reason: String| StorageError::Upload {
            key: key.to_string(),
            reason,
        };

        let headers = upload_headers(metadata).map_err(upload_error)?;
        let response = self
            .bucket
            .put_object_builder(key, &data)
            .with_content_type(content_type)
            .with_headers(headers)
            .execute()
            .await
            .map_err(|e| upload_error(e.to_string()))?;

        if !is_success(response.status_code()) {
            return Err(upload_error(format!("HTTP {}", response.status_code())));
        }

        debug!(
            "Uploaded '{}' ({} bytes) to bucket '{}'",
            key,
            data.len(),
            self.bucket.name()
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let response = self
            .bucket
            .get_object(key)
            .await
            .map_err(|e| StorageError::Download {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        match response.status_code() {
            404 => Err(StorageError::NotFound(key.to_string())),
            status if !is_success(status) => Err(StorageError::Download {
                key: key.to_string(),
                reason: format!("HTTP {}", status),
            }),
            _ => {
                debug!("Downloaded '{}' ({} bytes)", key, response.bytes().len());
                Ok(response.bytes().to_vec())
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| StorageError::Delete {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        // S3 answers 204 for missing keys; some compatible stores answer 404
        let status = response.status_code();
        if !is_success(status) && status != 404 {
            return Err(StorageError::Delete {
                key: key.to_string(),
                reason: format!("HTTP {}", status),
            });
        }

        debug!("Deleted '{}' from bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    async fn presign_get(&self, key: &str, expires_in_secs: u32) -> Result<String, StorageError> {
        self.bucket
            .presign_get(key, expires_in_secs, None)
            .await
            .map_err(|e| StorageError::Presign {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_upload_headers_request_sse_and_metadata() {
        let user_id = Uuid::new_v4();
        let metadata = ObjectMetadata::for_file(user_id, "9f86d081884c7d65");

        let headers = upload_headers(&metadata).unwrap();

        assert_eq!(headers["x-amz-server-side-encryption"], "AES256");
        assert_eq!(headers["x-amz-meta-user-id"], user_id.to_string().as_str());
        assert_eq!(headers["x-amz-meta-file-hash"], "9f86d081884c7d65");
        assert!(headers.get("x-amz-meta-is-thumbnail").is_none());
    }

    #[test]
    fn test_thumbnail_upload_headers_are_flagged() {
        let metadata = ObjectMetadata::for_file(Uuid::new_v4(), "9f86d081884c7d65").thumbnail();

        let headers = upload_headers(&metadata).unwrap();

        assert_eq!(headers["x-amz-server-side-encryption"], "AES256");
        assert_eq!(headers["x-amz-meta-is-thumbnail"], "true");
    }

    #[test]
    fn test_is_success() {
        assert!(is_success(200));
        assert!(is_success(204));
        assert!(!is_success(404));
        assert!(!is_success(500));
    }
}
