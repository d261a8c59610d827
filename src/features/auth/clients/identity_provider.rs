use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::users::models::UserType;

#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider refused the request (bad credentials, duplicate account, weak password)
    #[error("{0}")]
    Rejected(String),

    /// The provider could not be reached or answered unexpectedly
    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Login identifier. Phone takes precedence when both are supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Phone(String),
    Email(String),
}

#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub credential: Credential,
    pub password: String,
    pub phone: String,
    pub email: String,
    pub user_type: UserType,
}

/// Account as reported by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IdentityUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub user_metadata: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IdentitySession {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub refresh_token: String,
    pub user: IdentityUser,
}

/// Password-based identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<IdentityUser, IdentityError>;

    async fn sign_in(
        &self,
        credential: &Credential,
        password: &str,
    ) -> Result<IdentitySession, IdentityError>;

    /// Revoke the session behind `access_token`
    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), IdentityError>;
}
