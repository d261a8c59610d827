use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::whatsapp::handlers::{receive_webhook, verify_webhook};
use crate::features::whatsapp::services::WhatsAppService;

/// Public webhook routes called by Meta
pub fn routes(service: Arc<WhatsAppService>) -> Router {
    Router::new()
        .route(
            "/api/whatsapp/webhook",
            get(verify_webhook).post(receive_webhook),
        )
        .with_state(service)
}
