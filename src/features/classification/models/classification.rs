use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::shared::constants::{
    DEFAULT_PARSED_CONFIDENCE, FALLBACK_CONFIDENCE, UNKNOWN_DOCUMENT_TYPE,
};
use crate::shared::format::file_stem;
use crate::shared::llm::LlmResponse;

/// Classification as returned by the model. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClassificationReply {
    /// Kind of document, e.g. "Invoice" or "Memorandum of Association"
    #[serde(default)]
    pub document_type: Option<String>,

    /// Certainty of the classification between 0 and 1
    #[serde(default)]
    pub confidence: Option<f64>,

    /// Descriptive file name without extension
    #[serde(default)]
    pub suggested_name: Option<String>,

    /// Short lowercase keywords
    #[serde(default)]
    pub tags: Vec<String>,
}

impl LlmResponse for ClassificationReply {}

/// Classification with every default applied
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentClassification {
    pub document_type: String,
    pub confidence: f64,
    pub suggested_name: String,
    pub tags: Vec<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl DocumentClassification {
    /// Used when the classifier failed outright
    pub fn fallback(file_name: &str) -> Self {
        Self {
            document_type: UNKNOWN_DOCUMENT_TYPE.to_string(),
            confidence: FALLBACK_CONFIDENCE,
            suggested_name: file_stem(file_name).to_string(),
            tags: Vec::new(),
        }
    }

    pub fn from_reply(reply: ClassificationReply, file_name: &str) -> Self {
        let confidence = match reply.confidence {
            Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
            _ => DEFAULT_PARSED_CONFIDENCE,
        };

        let tags = reply
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        Self {
            document_type: present(reply.document_type)
                .unwrap_or_else(|| UNKNOWN_DOCUMENT_TYPE.to_string()),
            confidence,
            suggested_name: present(reply.suggested_name)
                .unwrap_or_else(|| file_stem(file_name).to_string()),
            tags,
        }
    }
}
