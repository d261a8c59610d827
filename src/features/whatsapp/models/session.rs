use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Conversation state kept between messages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// File ids of the last multi-hit search, in the order they were listed
    #[serde(default)]
    pub last_results: Vec<Uuid>,
}

/// One chat per phone number, bound to a vault user
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)]
pub struct WhatsAppSession {
    pub id: Uuid,
    pub phone_number: String,
    pub user_id: Uuid,
    pub session_data: Json<SessionData>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
