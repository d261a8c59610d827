use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use std::time::Duration;

use super::model::{AuthenticatedUser, TokenClaims};
use crate::core::error::{AppError, Result};
use crate::features::users::UserRepository;

/// Audience Supabase puts on tokens issued to signed-in users
const SUPABASE_AUDIENCE: &str = "authenticated";

/// Verifies Supabase access tokens (HS256, project JWT secret) and resolves
/// them to a vault user.
pub struct JwtValidator {
    decoding_key: DecodingKey,
    leeway: u64,
    users: Arc<dyn UserRepository>,
}

impl JwtValidator {
    pub fn new(jwt_secret: &str, leeway: Duration, users: Arc<dyn UserRepository>) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            leeway: leeway.as_secs(),
            users,
        }
    }

    pub fn decode_claims(&self, token: &str) -> Result<TokenClaims> {
        let header = decode_header(token).map_err(|e| {
            tracing::debug!("Rejected token header: {}", e);
            AppError::Unauthorized("Invalid token".to_string())
        })?;

        if header.alg != Algorithm::HS256 {
            return Err(AppError::Unauthorized(format!(
                "Unsupported algorithm: {:?}",
                header.alg
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[SUPABASE_AUDIENCE]);
        validation.leeway = self.leeway;

        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!("Rejected token: {}", e);
            AppError::Unauthorized("Invalid or expired token".to_string())
        })?;

        Ok(data.claims)
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser> {
        let claims = self.decode_claims(token)?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::warn!("Token subject {} has no vault user", claims.sub);
                AppError::Unauthorized("Unauthorized".to_string())
            })?;

        Ok(AuthenticatedUser::from_user(user, token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{sample_user, sign_test_token, InMemoryUserRepository, TEST_JWT_SECRET};

    fn validator(users: Arc<InMemoryUserRepository>) -> JwtValidator {
        JwtValidator::new(TEST_JWT_SECRET, Duration::from_secs(0), users)
    }

    #[tokio::test]
    async fn test_valid_token_resolves_user() {
        let user = sample_user();
        let users = Arc::new(InMemoryUserRepository::with_users(vec![user.clone()]));

        let token = sign_test_token(user.id, TEST_JWT_SECRET);
        let principal = validator(users).validate_token(&token).await.unwrap();

        assert_eq!(principal.id, user.id);
        assert_eq!(principal.foundarv_id, user.foundarv_id);
        assert_eq!(principal.access_token, token);
    }

    #[tokio::test]
    async fn test_token_with_wrong_secret_is_rejected() {
        let user = sample_user();
        let users = Arc::new(InMemoryUserRepository::with_users(vec![user.clone()]));

        let token = sign_test_token(user.id, "some-other-secret");
        let result = validator(users).validate_token(&token).await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_unknown_subject_is_rejected() {
        let users = Arc::new(InMemoryUserRepository::default());

        let token = sign_test_token(uuid::Uuid::new_v4(), TEST_JWT_SECRET);
        let result = validator(users).validate_token(&token).await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let users = Arc::new(InMemoryUserRepository::default());
        let result = validator(users).decode_claims("not.a.jwt");

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
}
