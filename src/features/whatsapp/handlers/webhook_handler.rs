use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::whatsapp::models::{
    VerifyParams, WebhookAckDto, WebhookPayload, WHATSAPP_WEBHOOK_OBJECT,
};
use crate::features::whatsapp::services::WhatsAppService;
use crate::shared::types::ErrorResponse;

/// Webhook subscription handshake
#[utoipa::path(
    get,
    path = "/api/whatsapp/webhook",
    tag = "whatsapp",
    params(
        ("hub.mode" = Option<String>, Query, description = "Must be `subscribe`"),
        ("hub.verify_token" = Option<String>, Query, description = "Configured verify token"),
        ("hub.challenge" = Option<String>, Query, description = "Echoed back on success")
    ),
    responses(
        (status = 200, description = "Challenge echoed", body = String, content_type = "text/plain"),
        (status = 403, description = "Verification failed", body = String, content_type = "text/plain")
    )
)]
pub async fn verify_webhook(
    State(service): State<Arc<WhatsAppService>>,
    Query(params): Query<VerifyParams>,
) -> Response {
    if service.verify_subscription(params.mode.as_deref(), params.verify_token.as_deref()) {
        tracing::info!("WhatsApp webhook verified");
        (StatusCode::OK, params.challenge.unwrap_or_default()).into_response()
    } else {
        tracing::warn!("WhatsApp webhook verification failed");
        (StatusCode::FORBIDDEN, "Forbidden").into_response()
    }
}

/// Inbound WhatsApp notifications
#[utoipa::path(
    post,
    path = "/api/whatsapp/webhook",
    tag = "whatsapp",
    request_body = WebhookPayload,
    responses(
        (status = 200, description = "Notification accepted", body = WebhookAckDto),
        (status = 400, description = "Malformed payload or foreign object", body = ErrorResponse)
    )
)]
pub async fn receive_webhook(
    State(service): State<Arc<WhatsAppService>>,
    AppJson(payload): AppJson<WebhookPayload>,
) -> Result<Json<WebhookAckDto>> {
    if payload.object != WHATSAPP_WEBHOOK_OBJECT {
        return Err(AppError::BadRequest("Invalid webhook object".to_string()));
    }

    let handled = service.handle_webhook(payload).await;
    tracing::debug!("Handled {} WhatsApp messages", handled);

    Ok(Json(WebhookAckDto {
        status: "ok".to_string(),
    }))
}
