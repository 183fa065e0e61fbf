use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{AuthErrorBody, AuthSession, PasswordSignInRequest, PasswordSignInResponse},
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{join_path, StoreCredentials};

#[derive(Debug, Error)]
pub enum AuthError {
    /// Provider-supplied message, shown to the user as-is.
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Validation(String),
    #[error("auth request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("auth response could not be parsed: {0}")]
    MalformedResponse(#[from] serde_json::Error),
    #[error("invalid auth url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("sign-in is not configured")]
    Unavailable,
}

impl AuthError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AuthError::Rejected(_) => ErrorCode::Unauthorized,
            AuthError::Validation(_) | AuthError::InvalidUrl(_) => ErrorCode::Validation,
            AuthError::Transport(_) => ErrorCode::Network,
            AuthError::MalformedResponse(_) => ErrorCode::MalformedResponse,
            AuthError::Unavailable => ErrorCode::Internal,
        }
    }
}

impl From<&AuthError> for ApiError {
    fn from(value: &AuthError) -> Self {
        ApiError::new(value.code(), value.to_string())
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError>;
}

pub struct MissingAuthProvider;

#[async_trait]
impl AuthProvider for MissingAuthProvider {
    async fn sign_in_with_password(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<AuthSession, AuthError> {
        Err(AuthError::Unavailable)
    }
}

pub struct PasswordAuthClient {
    http: Client,
    credentials: StoreCredentials,
}

impl PasswordAuthClient {
    pub fn new(credentials: StoreCredentials) -> Self {
        Self::with_client(Client::new(), credentials)
    }

    pub fn with_client(http: Client, credentials: StoreCredentials) -> Self {
        Self { http, credentials }
    }
}

#[async_trait]
impl AuthProvider for PasswordAuthClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let mut url = join_path(&self.credentials.base_url, "auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self
            .http
            .post(url)
            .header("apikey", &self.credentials.anon_key)
            .json(&PasswordSignInRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body: AuthErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            let message = body
                .human_message()
                .map(str::to_owned)
                .or_else(|| status.canonical_reason().map(str::to_owned))
                .unwrap_or_else(|| format!("sign-in failed with status {}", status.as_u16()));
            warn!(status = status.as_u16(), "password sign-in rejected");
            return Err(AuthError::Rejected(message));
        }

        let body: PasswordSignInResponse = serde_json::from_slice(&bytes)?;
        let session = AuthSession::from_response(body, Utc::now());
        info!(user_id = %session.user_id, "signed in");
        Ok(session)
    }
}
