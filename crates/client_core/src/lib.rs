use url::Url;

pub mod auth;
pub mod extract;
pub mod store;
pub mod webhook;
pub mod workflow;

pub use auth::{AuthError, AuthProvider, MissingAuthProvider, PasswordAuthClient};
pub use extract::{extract_summary, ExtractedSummary};
pub use store::{MissingSummaryStore, RestSummaryStore, StoreError, SummaryStore};
pub use webhook::{Summarizer, WebhookError, WebhookSummarizer};
pub use workflow::{LoadingFlag, SummarizeWorkflow, WorkflowOutcome, WorkflowPhase};

/// Project URL and public key of the hosted database, shared by the store and
/// auth clients.
#[derive(Debug, Clone)]
pub struct StoreCredentials {
    pub base_url: Url,
    pub anon_key: String,
}

/// Joins `path` below `base`, keeping any path prefix `base` already has.
pub(crate) fn join_path(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    if base.path().ends_with('/') {
        base.join(path)
    } else {
        let mut prefixed = base.clone();
        prefixed.set_path(&format!("{}/", base.path()));
        prefixed.join(path)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod workflow_tests;

#[cfg(test)]
#[path = "tests/auth_tests.rs"]
mod auth_tests;
