use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared::{
    error::{ApiError, ErrorCode},
    protocol::SummarizeRequest,
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("summarizer request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("summarizer returned a non-JSON body (status {status}): {source}")]
    MalformedBody {
        status: u16,
        source: serde_json::Error,
    },
    #[error("summarizer response has a non-text value ({extractor})")]
    UnexpectedShape { extractor: &'static str },
}

impl WebhookError {
    pub fn code(&self) -> ErrorCode {
        match self {
            WebhookError::Transport(_) => ErrorCode::Network,
            WebhookError::MalformedBody { .. } | WebhookError::UnexpectedShape { .. } => {
                ErrorCode::MalformedResponse
            }
        }
    }
}

impl From<&WebhookError> for ApiError {
    fn from(value: &WebhookError) -> Self {
        ApiError::new(value.code(), value.to_string())
    }
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Returns the parsed response body. Status codes are not interpreted.
    async fn summarize(&self, request: &SummarizeRequest) -> Result<Value, WebhookError>;
}

pub struct WebhookSummarizer {
    http: Client,
    endpoint: Url,
}

impl WebhookSummarizer {
    pub fn new(endpoint: Url) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(http: Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Summarizer for WebhookSummarizer {
    async fn summarize(&self, request: &SummarizeRequest) -> Result<Value, WebhookError> {
        debug!(
            endpoint = %self.endpoint,
            chars = request.chat_input.len(),
            "posting to summarizer webhook"
        );
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "summarizer webhook returned non-success status");
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|source| WebhookError::MalformedBody {
            status: status.as_u16(),
            source,
        })
    }
}
