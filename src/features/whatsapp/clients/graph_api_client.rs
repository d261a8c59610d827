use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::messenger::{MessagingError, OutboundMessage, WhatsAppMessenger};
use crate::core::config::WhatsAppConfig;

#[derive(Debug, Default, Deserialize)]
struct GraphErrorBody {
    #[serde(default)]
    error: Option<GraphError>,
}

#[derive(Debug, Default, Deserialize)]
struct GraphError {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MediaInfo {
    url: String,
}

/// Client for the WhatsApp Cloud API on the Meta Graph API
pub struct GraphApiClient {
    base_url: String,
    phone_number_id: String,
    access_token: String,
    http_client: reqwest::Client,
}

impl GraphApiClient {
    pub fn new(config: &WhatsAppConfig) -> Result<Self, MessagingError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| MessagingError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.graph_api_url.trim_end_matches('/').to_string(),
            phone_number_id: config.phone_number_id.clone(),
            access_token: config.access_token.clone(),
            http_client,
        })
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, MessagingError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GraphErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .and_then(|e| e.message)
            .unwrap_or(body);

        Err(MessagingError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Request body for `POST /<phone-number-id>/messages`
pub fn message_body(to: &str, message: &OutboundMessage) -> Result<Value, MessagingError> {
    let mut body =
        serde_json::to_value(message).map_err(|e| MessagingError::InvalidResponse(e.to_string()))?;
    if let Value::Object(map) = &mut body {
        map.insert("messaging_product".to_string(), Value::from("whatsapp"));
        map.insert("recipient_type".to_string(), Value::from("individual"));
        map.insert("to".to_string(), Value::from(to));
    }
    Ok(body)
}

#[async_trait]
impl WhatsAppMessenger for GraphApiClient {
    async fn send(&self, to: &str, message: &OutboundMessage) -> Result<Option<String>, MessagingError> {
        let body = message_body(to, message)?;

        let response = self
            .http_client
            .post(format!("{}/{}/messages", self.base_url, self.phone_number_id))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| MessagingError::Request(e.to_string()))?;

        let sent = Self::check(response)
            .await?
            .json::<SendResponse>()
            .await
            .map_err(|e| MessagingError::InvalidResponse(e.to_string()))?;

        Ok(sent.messages.into_iter().next().map(|m| m.id))
    }

    async fn media_url(&self, media_id: &str) -> Result<String, MessagingError> {
        let response = self
            .http_client
            .get(format!("{}/{}", self.base_url, media_id))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| MessagingError::Request(e.to_string()))?;

        let info = Self::check(response)
            .await?
            .json::<MediaInfo>()
            .await
            .map_err(|e| MessagingError::InvalidResponse(e.to_string()))?;

        Ok(info.url)
    }

    async fn download_media(&self, url: &str) -> Result<Vec<u8>, MessagingError> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| MessagingError::Request(e.to_string()))?;

        let bytes = Self::check(response)
            .await?
            .bytes()
            .await
            .map_err(|e| MessagingError::Request(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}
