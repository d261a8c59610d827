use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `object` value of genuine WhatsApp Business webhooks
pub const WHATSAPP_WEBHOOK_OBJECT: &str = "whatsapp_business_account";

/// Webhook notification body
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WebhookPayload {
    pub object: String,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookChange {
    pub field: String,
    #[serde(default)]
    pub value: ChangeValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
    #[serde(default)]
    pub statuses: Vec<StatusEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    /// Sender phone number, digits only
    pub from: String,
    pub id: String,
    #[serde(flatten)]
    pub content: MessageContent,
}

/// Message body keyed by the `type` field
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    Text { text: TextBody },
    Image { image: MediaRef },
    Document { document: MediaRef },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextBody {
    pub body: String,
}

/// Inbound media attachment, fetched separately by id
#[derive(Debug, Clone, Deserialize)]
pub struct MediaRef {
    pub id: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Delivery status update for an outbound message
#[derive(Debug, Clone, Deserialize)]
pub struct StatusEvent {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub recipient_id: Option<String>,
}

/// Query of the subscription handshake
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookAckDto {
    pub status: String,
}
