use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use minijinja::context;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::classifier::{ClassificationError, ClassificationInput, DocumentClassifier};
use crate::core::config::OpenAiConfig;
use crate::features::classification::models::{parse_labeled_lines, ClassificationReply};
use crate::shared::llm::{parse_structured, LlmResponse};
use crate::shared::templates::render_template;

const CLASSIFICATION_PROMPT: &str = "prompts/classification.jinja";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Value>,
    response_format: Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Classifier backed by the OpenAI chat completions API. Images are attached
/// inline as data URLs; other files are classified from their metadata.
pub struct OpenAiClassifier {
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    http_client: reqwest::Client,
}

impl OpenAiClassifier {
    pub fn new(config: &OpenAiConfig) -> Result<Self, ClassificationError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClassificationError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            http_client,
        })
    }

    fn build_messages(&self, input: &ClassificationInput<'_>) -> Result<Vec<Value>, ClassificationError> {
        let has_image = input.is_image();
        let prompt = render_template(
            CLASSIFICATION_PROMPT,
            context! {
                json_schema => ClassificationReply::json_schema_string(),
                file_name => input.file_name,
                mime_type => input.mime_type,
                size => input.bytes.len(),
                has_image => has_image,
            },
        )
        .map_err(|e| ClassificationError::Prompt(e.to_string()))?;

        let mut content = vec![json!({ "type": "text", "text": prompt })];
        if has_image {
            content.push(json!({
                "type": "image_url",
                "image_url": {
                    "url": format!("data:{};base64,{}", input.mime_type, STANDARD.encode(input.bytes)),
                },
            }));
        }

        Ok(vec![json!({ "role": "user", "content": content })])
    }
}

/// Structured JSON first, `Label: value` lines second
pub fn parse_reply(text: &str) -> Result<ClassificationReply, ClassificationError> {
    match parse_structured::<ClassificationReply>(text) {
        Ok(reply) => Ok(reply),
        Err(json_error) => {
            tracing::debug!("Structured parse failed ({}), trying line parser", json_error);
            parse_labeled_lines(text)
                .ok_or_else(|| ClassificationError::Unparseable(json_error.to_string()))
        }
    }
}

#[async_trait]
impl DocumentClassifier for OpenAiClassifier {
    async fn classify(
        &self,
        input: &ClassificationInput<'_>,
    ) -> Result<ClassificationReply, ClassificationError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: self.build_messages(input)?,
            response_format: json!({ "type": "json_object" }),
        };

        tracing::debug!(
            "Classifying {} ({}, {} bytes) with {}",
            input.file_name,
            input.mime_type,
            input.bytes.len(),
            self.model
        );

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClassificationError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassificationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| ClassificationError::Request(format!("Invalid response body: {}", e)))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ClassificationError::EmptyReply)?;

        parse_reply(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn classifier() -> OpenAiClassifier {
        OpenAiClassifier::new(&OpenAiConfig {
            api_key: "sk-test".to_string(),
            base_url: "https://api.openai.com/v1/".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 500,
            request_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_parse_reply_prefers_json() {
        let reply = parse_reply(
            "```json\n{\"document_type\": \"Receipt\", \"confidence\": 0.8, \"tags\": [\"food\"]}\n```",
        )
        .unwrap();

        assert_eq!(reply.document_type.as_deref(), Some("Receipt"));
        assert_eq!(reply.confidence, Some(0.8));
        assert_eq!(reply.tags, vec!["food"]);
    }

    #[test]
    fn test_parse_reply_falls_back_to_lines() {
        let reply = parse_reply("Document type: Certificate\nConfidence: 0.6").unwrap();

        assert_eq!(reply.document_type.as_deref(), Some("Certificate"));
        assert_eq!(reply.confidence, Some(0.6));
    }

    #[test]
    fn test_parse_reply_rejects_prose() {
        let result = parse_reply("Sorry, I can't help with that.");
        assert!(matches!(result, Err(ClassificationError::Unparseable(_))));
    }

    #[test]
    fn test_image_is_attached_as_data_url() {
        let input = ClassificationInput {
            file_name: "id-card.png",
            mime_type: "image/png",
            bytes: b"\x89PNG",
        };

        let messages = classifier().build_messages(&input).unwrap();

        let content = messages[0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 2);
        assert!(content[0]["text"].as_str().unwrap().contains("id-card.png"));
        assert!(content[1]["image_url"]["url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_non_image_is_text_only() {
        let input = ClassificationInput {
            file_name: "contract.pdf",
            mime_type: "application/pdf",
            bytes: b"%PDF-1.4",
        };

        let messages = classifier().build_messages(&input).unwrap();

        let content = messages[0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 1);
        assert!(content[0]["text"].as_str().unwrap().contains("not attached"));
    }
}
