use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("Messaging request failed: {0}")]
    Request(String),

    #[error("Messaging API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected messaging API response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaLink {
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Outbound message, serialized the way the Cloud API expects
/// (`{"type": "text", "text": {...}}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    Text { text: TextContent },
    Image { image: MediaLink },
    Document { document: MediaLink },
}

impl OutboundMessage {
    pub fn text(body: impl Into<String>) -> Self {
        OutboundMessage::Text {
            text: TextContent { body: body.into() },
        }
    }

    pub fn image(link: String, caption: String) -> Self {
        OutboundMessage::Image {
            image: MediaLink {
                link,
                filename: None,
                caption: Some(caption),
            },
        }
    }

    pub fn document(link: String, filename: String, caption: String) -> Self {
        OutboundMessage::Document {
            document: MediaLink {
                link,
                filename: Some(filename),
                caption: Some(caption),
            },
        }
    }
}

/// WhatsApp messaging channel
#[async_trait]
pub trait WhatsAppMessenger: Send + Sync {
    /// Send `message` to `to`, returning the provider message id when given
    async fn send(&self, to: &str, message: &OutboundMessage) -> Result<Option<String>, MessagingError>;

    /// Resolve an inbound media id to a short-lived download URL
    async fn media_url(&self, media_id: &str) -> Result<String, MessagingError>;

    async fn download_media(&self, url: &str) -> Result<Vec<u8>, MessagingError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_wire_shape() {
        let value = serde_json::to_value(OutboundMessage::text("hi")).unwrap();
        assert_eq!(value, json!({ "type": "text", "text": { "body": "hi" } }));
    }

    #[test]
    fn test_document_wire_shape() {
        let message = OutboundMessage::document(
            "https://s3/x".to_string(),
            "Deed.pdf".to_string(),
            "📄 Deed".to_string(),
        );

        let value = serde_json::to_value(message).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "document",
                "document": { "link": "https://s3/x", "filename": "Deed.pdf", "caption": "📄 Deed" }
            })
        );
    }
}
