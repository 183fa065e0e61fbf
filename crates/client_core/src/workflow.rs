//! Summarize-and-persist workflow.
//!
//! `Idle -> Running -> {Done, Failed}`; a terminal phase goes back to
//! `Running` on the next accepted call. At most one run is in flight per
//! workflow, enforced by [`LoadingFlag`].

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::{
    domain::{word_count, SummaryResult},
    error::ApiError,
    protocol::{SummarizeRequest, SummaryRecord},
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{extract::extract_summary, store::SummaryStore, webhook::Summarizer};

#[derive(Debug, Clone, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn is_loading(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn try_begin(&self) -> Option<LoadingGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| LoadingGuard(self.clone()))
    }
}

/// Clears the flag on every exit path, including panics and dropped futures.
struct LoadingGuard(LoadingFlag);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        (self.0).0.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowPhase {
    #[default]
    Idle,
    Running,
    Done,
    Failed,
}

#[derive(Debug, Clone)]
pub enum WorkflowOutcome {
    Done(SummaryResult),
    Failed {
        result: SummaryResult,
        error: ApiError,
    },
}

impl WorkflowOutcome {
    pub fn result(&self) -> &SummaryResult {
        match self {
            WorkflowOutcome::Done(result) => result,
            WorkflowOutcome::Failed { result, .. } => result,
        }
    }

    pub fn into_result(self) -> SummaryResult {
        match self {
            WorkflowOutcome::Done(result) => result,
            WorkflowOutcome::Failed { result, .. } => result,
        }
    }

    pub fn phase(&self) -> WorkflowPhase {
        match self {
            WorkflowOutcome::Done(_) => WorkflowPhase::Done,
            WorkflowOutcome::Failed { .. } => WorkflowPhase::Failed,
        }
    }
}

pub struct SummarizeWorkflow {
    summarizer: Arc<dyn Summarizer>,
    store: Arc<dyn SummaryStore>,
    loading: LoadingFlag,
    phase: Mutex<WorkflowPhase>,
}

impl SummarizeWorkflow {
    pub fn new(summarizer: Arc<dyn Summarizer>, store: Arc<dyn SummaryStore>) -> Self {
        Self {
            summarizer,
            store,
            loading: LoadingFlag::default(),
            phase: Mutex::new(WorkflowPhase::Idle),
        }
    }

    pub fn loading_flag(&self) -> LoadingFlag {
        self.loading.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    pub async fn phase(&self) -> WorkflowPhase {
        *self.phase.lock().await
    }

    /// Returns `None` without touching the network when the trimmed input is
    /// empty or another run is in flight.
    pub async fn run(&self, raw_input: &str) -> Option<WorkflowOutcome> {
        let trimmed = raw_input.trim();
        if trimmed.is_empty() {
            debug!("summarize skipped: empty input");
            return None;
        }
        let Some(_loading) = self.loading.try_begin() else {
            debug!("summarize skipped: a run is already in flight");
            return None;
        };
        *self.phase.lock().await = WorkflowPhase::Running;

        let original_word_count = word_count(trimmed);
        let request = SummarizeRequest::send_message(trimmed);

        let response = self
            .summarizer
            .summarize(&request)
            .await
            .and_then(|body| extract_summary(&body));
        let outcome = match response {
            Ok(extracted) => {
                debug!(source = extracted.source, "extracted summary text");
                let result = SummaryResult::completed(original_word_count, extracted.text);
                self.persist(raw_input, &result.summary_text).await;
                info!(
                    original_words = result.original_word_count,
                    summary_words = result.summary_word_count,
                    "summary ready"
                );
                WorkflowOutcome::Done(result)
            }
            Err(err) => {
                error!(error = %err, "summarize request failed");
                WorkflowOutcome::Failed {
                    result: SummaryResult::failed(original_word_count),
                    error: ApiError::from(&err),
                }
            }
        };

        *self.phase.lock().await = outcome.phase();
        Some(outcome)
    }

    async fn persist(&self, raw_input: &str, summary: &str) {
        let record = SummaryRecord {
            content: raw_input.to_string(),
            summary: summary.to_string(),
        };
        if let Err(err) = self.store.insert(&record).await {
            warn!(error = %err, code = ?err.code(), "failed to persist summary; ignoring");
        }
    }
}
