use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::core::error::Result;
use crate::features::audit::models::{AuditLog, NewAuditLog};

#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn append(&self, entry: NewAuditLog) -> Result<AuditLog>;
}

pub struct PgAuditRepository {
    pool: PgPool,
}

impl PgAuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PgAuditRepository {
    async fn append(&self, entry: NewAuditLog) -> Result<AuditLog> {
        let details = (!entry.details.is_null()).then(|| Json(entry.details));

        let log = sqlx::query_as::<_, AuditLog>(
            r#"
            INSERT INTO audit_logs
                (user_id, action, resource_type, resource_id, details, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, action, resource_type, resource_id, details,
                      ip_address, user_agent, created_at
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.action.as_str())
        .bind(entry.resource_type.as_str())
        .bind(entry.resource_id)
        .bind(details)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .fetch_one(&self.pool)
        .await?;

        Ok(log)
    }
}
