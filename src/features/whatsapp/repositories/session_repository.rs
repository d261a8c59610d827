use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::whatsapp::models::{SessionData, WhatsAppSession};

const SESSION_COLUMNS: &str = "id, phone_number, user_id, session_data, created_at, updated_at";

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<WhatsAppSession>>;

    async fn create(&self, phone_number: &str, user_id: Uuid) -> Result<WhatsAppSession>;

    async fn update_data(&self, id: Uuid, data: &SessionData) -> Result<()>;
}

pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<WhatsAppSession>> {
        let session = sqlx::query_as::<_, WhatsAppSession>(&format!(
            "SELECT {} FROM whatsapp_sessions WHERE phone_number = $1",
            SESSION_COLUMNS
        ))
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn create(&self, phone_number: &str, user_id: Uuid) -> Result<WhatsAppSession> {
        // A concurrent first message may have created the row already
        let session = sqlx::query_as::<_, WhatsAppSession>(&format!(
            r#"
            INSERT INTO whatsapp_sessions (id, phone_number, user_id, session_data)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (phone_number) DO UPDATE SET updated_at = NOW()
            RETURNING {}
            "#,
            SESSION_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(phone_number)
        .bind(user_id)
        .bind(Json(SessionData::default()))
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    async fn update_data(&self, id: Uuid, data: &SessionData) -> Result<()> {
        sqlx::query(
            "UPDATE whatsapp_sessions SET session_data = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(Json(data))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
