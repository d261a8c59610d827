use async_trait::async_trait;
use thiserror::Error;

use crate::features::classification::models::ClassificationReply;

#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("Classification request failed: {0}")]
    Request(String),

    #[error("Classification API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Classification API returned no content")]
    EmptyReply,

    #[error("Could not parse classification reply: {0}")]
    Unparseable(String),

    #[error("Failed to build classification prompt: {0}")]
    Prompt(String),
}

/// Document handed to a classifier
#[derive(Debug, Clone, Copy)]
pub struct ClassificationInput<'a> {
    pub file_name: &'a str,
    pub mime_type: &'a str,
    pub bytes: &'a [u8],
}

impl ClassificationInput<'_> {
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Model-backed document classifier
#[async_trait]
pub trait DocumentClassifier: Send + Sync {
    async fn classify(
        &self,
        input: &ClassificationInput<'_>,
    ) -> Result<ClassificationReply, ClassificationError>;
}
