use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage client configuration error: {0}")]
    Config(String),

    #[error("Failed to upload '{key}': {reason}")]
    Upload { key: String, reason: String },

    #[error("Object '{0}' not found")]
    NotFound(String),

    #[error("Failed to download '{key}': {reason}")]
    Download { key: String, reason: String },

    #[error("Failed to delete '{key}': {reason}")]
    Delete { key: String, reason: String },

    #[error("Failed to presign '{key}': {reason}")]
    Presign { key: String, reason: String },
}

/// User metadata stored with an object as `x-amz-meta-*` headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub user_id: Uuid,
    pub file_hash: String,
    pub is_thumbnail: bool,
}

impl ObjectMetadata {
    pub fn for_file(user_id: Uuid, file_hash: &str) -> Self {
        Self {
            user_id,
            file_hash: file_hash.to_string(),
            is_thumbnail: false,
        }
    }

    pub fn thumbnail(&self) -> Self {
        Self {
            is_thumbnail: true,
            ..self.clone()
        }
    }

    /// `(name, value)` pairs without the `x-amz-meta-` prefix
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = vec![
            ("user-id", self.user_id.to_string()),
            ("file-hash", self.file_hash.clone()),
        ];
        if self.is_thumbnail {
            entries.push(("is-thumbnail", "true".to_string()));
        }
        entries
    }
}

/// Object storage holding vault files and their thumbnails
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`, replacing any existing object. Objects are
    /// encrypted at rest by the store.
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> Result<(), StorageError>;

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Removing a missing key succeeds
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Time-limited GET URL for `key`
    async fn presign_get(&self, key: &str, expires_in_secs: u32) -> Result<String, StorageError>;
}

/// Key of the thumbnail stored beside an image: the extension of the last
/// path segment is replaced with `_thumb.jpg`.
///
/// `users/u/files/1700-abcd1234.png` -> `users/u/files/1700-abcd1234_thumb.jpg`
pub fn thumbnail_key(key: &str) -> String {
    let (dir, name) = match key.rsplit_once('/') {
        Some((dir, name)) => (Some(dir), name),
        None => (None, key),
    };

    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    };

    match dir {
        Some(dir) => format!("{}/{}_thumb.jpg", dir, stem),
        None => format!("{}_thumb.jpg", stem),
    }
}
