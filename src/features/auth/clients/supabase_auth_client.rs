use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::identity_provider::{
    Credential, IdentityError, IdentityProvider, IdentitySession, IdentityUser, SignUpRequest,
};
use crate::core::config::AuthConfig;

/// GoTrue error bodies come in a few shapes depending on the endpoint
#[derive(Debug, Default, Deserialize)]
struct GoTrueErrorResponse {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl GoTrueErrorResponse {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

/// Sign-up answers with a session when autoconfirm is on, otherwise the bare user
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(IdentitySession),
    User(IdentityUser),
}

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    password: &'a str,
}

impl<'a> PasswordGrant<'a> {
    fn new(credential: &'a Credential, password: &'a str) -> Self {
        match credential {
            Credential::Phone(phone) => Self {
                email: None,
                phone: Some(phone),
                password,
            },
            Credential::Email(email) => Self {
                email: Some(email),
                phone: None,
                password,
            },
        }
    }
}

/// Client for the Supabase Auth (GoTrue) REST API
pub struct SupabaseAuthClient {
    base_url: String,
    anon_key: String,
    http_client: reqwest::Client,
}

impl SupabaseAuthClient {
    pub fn new(config: &AuthConfig) -> Result<Self, IdentityError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| IdentityError::Unavailable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: format!("{}/auth/v1", config.supabase_url),
            anon_key: config.anon_key.clone(),
            http_client,
        })
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http_client
            .post(format!("{}{}", self.base_url, path))
            .header("apikey", &self.anon_key)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, IdentityError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!("Supabase auth request failed: {}", e);
            IdentityError::Unavailable(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GoTrueErrorResponse>(&body)
            .ok()
            .and_then(GoTrueErrorResponse::into_message);

        if status.is_client_error() {
            tracing::debug!("Supabase auth rejected request: HTTP {} - {}", status, body);
            return Err(IdentityError::Rejected(
                message.unwrap_or_else(|| format!("Request rejected (HTTP {})", status)),
            ));
        }

        tracing::error!("Supabase auth error: HTTP {} - {}", status, body);
        Err(IdentityError::Unavailable(format!("HTTP {}", status)))
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuthClient {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<IdentityUser, IdentityError> {
        // The identifier not used for sign-up travels as user metadata
        let mut body = serde_json::to_value(PasswordGrant::new(&request.credential, &request.password))
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;
        body["data"] = json!({
            "phone": request.phone,
            "email": request.email,
            "user_type": request.user_type,
        });

        tracing::debug!("Signing up {:?} with Supabase", request.credential);

        let response = self.send(self.post("/signup").json(&body)).await?;
        let parsed = response.json::<SignUpResponse>().await.map_err(|e| {
            tracing::error!("Failed to parse Supabase sign-up response: {}", e);
            IdentityError::Unavailable(format!("Failed to parse sign-up response: {}", e))
        })?;

        Ok(match parsed {
            SignUpResponse::Session(session) => session.user,
            SignUpResponse::User(user) => user,
        })
    }

    async fn sign_in(
        &self,
        credential: &Credential,
        password: &str,
    ) -> Result<IdentitySession, IdentityError> {
        let response = self
            .send(
                self.post("/token?grant_type=password")
                    .json(&PasswordGrant::new(credential, password)),
            )
            .await?;

        response.json::<IdentitySession>().await.map_err(|e| {
            tracing::error!("Failed to parse Supabase session: {}", e);
            IdentityError::Unavailable(format!("Failed to parse session: {}", e))
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        self.send(self.post("/logout").bearer_auth(access_token))
            .await?;
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), IdentityError> {
        self.send(self.post("/recover").json(&json!({ "email": email })))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_grant_serializes_one_identifier() {
        let phone = Credential::Phone("+6281234567890".to_string());
        let value = serde_json::to_value(PasswordGrant::new(&phone, "hunter22")).unwrap();

        assert_eq!(value["phone"], "+6281234567890");
        assert!(value.get("email").is_none());
        assert_eq!(value["password"], "hunter22");
    }

    #[test]
    fn test_error_message_precedence() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        let parsed: GoTrueErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.into_message().as_deref(),
            Some("Invalid login credentials")
        );

        let body = r#"{"code":422,"msg":"User already registered"}"#;
        let parsed: GoTrueErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.into_message().as_deref(), Some("User already registered"));
    }

    #[test]
    fn test_sign_up_response_variants() {
        let user_only = r#"{"id":"6f1c1f7e-4c59-4a51-9d0e-0f5a2b7c1d11","email":"a@b.co"}"#;
        assert!(matches!(
            serde_json::from_str::<SignUpResponse>(user_only).unwrap(),
            SignUpResponse::User(_)
        ));

        let with_session = r#"{
            "access_token":"t","token_type":"bearer","expires_in":3600,"refresh_token":"r",
            "user":{"id":"6f1c1f7e-4c59-4a51-9d0e-0f5a2b7c1d11"}
        }"#;
        assert!(matches!(
            serde_json::from_str::<SignUpResponse>(with_session).unwrap(),
            SignUpResponse::Session(_)
        ));
    }
}
