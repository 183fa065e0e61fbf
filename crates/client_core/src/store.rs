use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client};
use shared::{error::ErrorCode, protocol::SummaryRecord};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use crate::{join_path, StoreCredentials};

pub const DEFAULT_SUMMARIES_TABLE: &str = "summaries";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("store rejected insert into '{table}' with status {status}: {body}")]
    Rejected {
        table: String,
        status: u16,
        body: String,
    },
    #[error("invalid store url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("store is not configured")]
    Unavailable,
}

impl StoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::Transport(_) => ErrorCode::Network,
            StoreError::Rejected { status: 401, .. } | StoreError::Rejected { status: 403, .. } => {
                ErrorCode::Unauthorized
            }
            StoreError::Rejected { .. } => ErrorCode::Rejected,
            StoreError::InvalidUrl(_) => ErrorCode::Validation,
            StoreError::Unavailable => ErrorCode::Internal,
        }
    }
}

#[async_trait]
pub trait SummaryStore: Send + Sync {
    async fn insert(&self, record: &SummaryRecord) -> Result<(), StoreError>;
}

pub struct MissingSummaryStore;

#[async_trait]
impl SummaryStore for MissingSummaryStore {
    async fn insert(&self, _record: &SummaryRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }
}

/// Inserts rows through the hosted database's REST interface.
pub struct RestSummaryStore {
    http: Client,
    credentials: StoreCredentials,
    table: String,
    access_token: RwLock<Option<String>>,
}

impl RestSummaryStore {
    pub fn new(credentials: StoreCredentials, table: impl Into<String>) -> Self {
        Self::with_client(Client::new(), credentials, table)
    }

    pub fn with_client(
        http: Client,
        credentials: StoreCredentials,
        table: impl Into<String>,
    ) -> Self {
        Self {
            http,
            credentials,
            table: table.into(),
            access_token: RwLock::new(None),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Inserts run as the signed-in user when a token is set, otherwise with
    /// the anonymous key.
    pub async fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().await = token;
    }

    fn table_url(&self) -> Result<Url, StoreError> {
        Ok(join_path(
            &self.credentials.base_url,
            &format!("rest/v1/{}", self.table),
        )?)
    }
}

#[async_trait]
impl SummaryStore for RestSummaryStore {
    async fn insert(&self, record: &SummaryRecord) -> Result<(), StoreError> {
        let url = self.table_url()?;
        let bearer = self
            .access_token
            .read()
            .await
            .clone()
            .unwrap_or_else(|| self.credentials.anon_key.clone());

        let response = self
            .http
            .post(url)
            .header("apikey", &self.credentials.anon_key)
            .header(AUTHORIZATION, format!("Bearer {bearer}"))
            .header("Prefer", "return=minimal")
            .json(&[record])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                table: self.table.clone(),
                status: status.as_u16(),
                body,
            });
        }

        debug!(table = %self.table, "stored summary record");
        Ok(())
    }
}
