use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::users::models::{User, UserType};

/// Principal attached to requests that passed `auth_middleware`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub foundarv_id: String,
    pub user_type: UserType,
    /// Bearer token of the current request, needed to revoke the session on logout
    #[serde(skip)]
    pub access_token: String,
}

impl AuthenticatedUser {
    pub fn from_user(user: User, access_token: String) -> Self {
        Self {
            id: user.id,
            phone: user.phone,
            email: user.email,
            foundarv_id: user.foundarv_id,
            user_type: user.user_type,
            access_token,
        }
    }
}

/// Claims of a Supabase access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: Uuid,
    pub exp: u64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}
