use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::auth::clients::{IdentitySession, IdentityUser};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::models::UserType;

/// Request DTO for login. One of `phone` or `email` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(regex(
        path = "*crate::shared::validation::PHONE_REGEX",
        message = "Invalid phone number format"
    ))]
    pub phone: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub password: Option<String>,
}

/// Request DTO for sign-up. Presence and password length are checked
/// before field formats.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequestDto {
    #[validate(regex(
        path = "*crate::shared::validation::PHONE_REGEX",
        message = "Invalid phone number format"
    ))]
    pub phone: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub password: Option<String>,

    #[serde(default)]
    pub user_type: Option<UserType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequestDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponseDto {
    pub success: bool,
    pub user: IdentityUser,
    pub session: IdentitySession,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignupResponseDto {
    pub success: bool,
    pub user: IdentityUser,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponseDto {
    pub user: AuthenticatedUser,
}
