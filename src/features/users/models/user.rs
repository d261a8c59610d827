use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Account type matching the `user_type` database enum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "user_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Individual,
    Founder,
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserType::Individual => write!(f, "individual"),
            UserType::Founder => write!(f, "founder"),
        }
    }
}

/// Vault account. `id` equals the identity provider's user id for accounts
/// created through sign-up.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Short human-facing id, e.g. `FV7K2Q9XMA`
    pub foundarv_id: String,
    pub user_type: UserType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a user row
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub foundarv_id: String,
    pub user_type: UserType,
}

const FOUNDARV_ID_PREFIX: &str = "FV";

/// Unambiguous upper-case alphabet (no 0/O, 1/I)
const FOUNDARV_ID_ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

const FOUNDARV_ID_LEN: usize = 8;

/// Generate a fresh foundarv id from random UUID bytes
pub fn generate_foundarv_id() -> String {
    let random = Uuid::new_v4();
    let suffix: String = random
        .as_bytes()
        .iter()
        .take(FOUNDARV_ID_LEN)
        .map(|b| FOUNDARV_ID_ALPHABET[usize::from(*b) % FOUNDARV_ID_ALPHABET.len()] as char)
        .collect();
    format!("{}{}", FOUNDARV_ID_PREFIX, suffix)
}

impl NewUser {
    pub fn new(id: Uuid, phone: Option<String>, email: Option<String>, user_type: UserType) -> Self {
        Self {
            id,
            phone,
            email,
            foundarv_id: generate_foundarv_id(),
            user_type,
        }
    }
}
