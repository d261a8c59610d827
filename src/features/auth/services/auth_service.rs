use std::sync::Arc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::clients::{
    Credential, IdentityError, IdentityProvider, IdentityUser, SignUpRequest,
};
use crate::features::auth::dtos::{
    LoginRequestDto, LoginResponseDto, MeResponseDto, ResetPasswordRequestDto, SignupRequestDto,
    SignupResponseDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::models::NewUser;
use crate::features::users::UserRepository;
use crate::shared::types::SuccessResponse;

const MIN_PASSWORD_LENGTH: usize = 8;

const SIGNUP_SUCCESS_MESSAGE: &str =
    "Account created successfully. Please check your email for verification.";

/// Service for sign-up, login, logout and password reset
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserRepository>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl AuthService {
    pub fn new(identity: Arc<dyn IdentityProvider>, users: Arc<dyn UserRepository>) -> Self {
        Self { identity, users }
    }

    pub async fn login(&self, dto: LoginRequestDto) -> Result<LoginResponseDto> {
        let password = dto
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::Validation("Password is required".to_string()))?;

        let credential = if let Some(phone) = non_empty(&dto.phone) {
            Credential::Phone(phone.to_string())
        } else if let Some(email) = non_empty(&dto.email) {
            Credential::Email(email.to_string())
        } else {
            return Err(AppError::Validation(
                "Phone or email is required".to_string(),
            ));
        };

        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let session = self
            .identity
            .sign_in(&credential, password)
            .await
            .map_err(|e| match e {
                IdentityError::Rejected(msg) => AppError::Unauthorized(msg),
                IdentityError::Unavailable(msg) => AppError::upstream("Authentication failed", msg),
            })?;

        tracing::info!("User {} signed in", session.user.id);

        Ok(LoginResponseDto {
            success: true,
            user: session.user.clone(),
            session,
        })
    }

    pub async fn signup(&self, dto: SignupRequestDto) -> Result<SignupResponseDto> {
        let password = dto
            .password
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::Validation("Password is required".to_string()))?;

        let (Some(phone), Some(email)) = (non_empty(&dto.phone), non_empty(&dto.email)) else {
            return Err(AppError::Validation(
                "Both phone and email are required".to_string(),
            ));
        };

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            )));
        }

        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let mut request = SignUpRequest {
            credential: Credential::Phone(phone.to_string()),
            password,
            phone: phone.to_string(),
            email: email.to_string(),
            user_type: dto.user_type.unwrap_or_default(),
        };

        let identity_user = match self.identity.sign_up(&request).await {
            Ok(user) => user,
            Err(phone_error) => {
                tracing::info!("Phone sign-up failed ({}), retrying with email", phone_error);
                request.credential = Credential::Email(email.to_string());
                self.identity
                    .sign_up(&request)
                    .await
                    .map_err(|e| match e {
                        IdentityError::Rejected(msg) => AppError::BadRequest(msg),
                        IdentityError::Unavailable(msg) => AppError::upstream("Signup failed", msg),
                    })?
            }
        };

        self.create_vault_user(&identity_user, &request).await?;

        Ok(SignupResponseDto {
            success: true,
            user: identity_user,
            message: SIGNUP_SUCCESS_MESSAGE.to_string(),
        })
    }

    async fn create_vault_user(
        &self,
        identity_user: &IdentityUser,
        request: &SignUpRequest,
    ) -> Result<()> {
        let user = self
            .users
            .create(NewUser::new(
                identity_user.id,
                Some(request.phone.clone()),
                Some(request.email.clone()),
                request.user_type,
            ))
            .await?;

        tracing::info!(
            "Created vault user {} ({}, {})",
            user.id,
            user.foundarv_id,
            user.user_type
        );
        Ok(())
    }

    pub async fn logout(&self, user: &AuthenticatedUser) -> Result<SuccessResponse> {
        self.identity
            .sign_out(&user.access_token)
            .await
            .map_err(|e| match e {
                IdentityError::Rejected(msg) => AppError::Unauthorized(msg),
                IdentityError::Unavailable(msg) => AppError::upstream("Logout failed", msg),
            })?;

        Ok(SuccessResponse::ok())
    }

    pub async fn reset_password(&self, dto: ResetPasswordRequestDto) -> Result<SuccessResponse> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.identity
            .send_password_reset(dto.email.trim())
            .await
            .map_err(|e| match e {
                IdentityError::Rejected(msg) => AppError::BadRequest(msg),
                IdentityError::Unavailable(msg) => {
                    AppError::upstream("Failed to send password reset", msg)
                }
            })?;

        Ok(SuccessResponse::ok())
    }

    pub fn current_user(&self, user: AuthenticatedUser) -> MeResponseDto {
        MeResponseDto { user }
    }
}
