use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use shared::{
    domain::SUMMARY_ERROR_MARKER,
    error::ErrorCode,
    protocol::{SummarizeRequest, SummaryRecord},
};
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex, Notify},
};
use url::Url;

use crate::tests::spawn_server;
use crate::{
    MissingSummaryStore, StoreError, SummarizeWorkflow, Summarizer, SummaryStore, WebhookError,
    WebhookSummarizer, WorkflowOutcome, WorkflowPhase,
};

#[derive(Clone, Default)]
struct RecordingStore {
    records: Arc<Mutex<Vec<SummaryRecord>>>,
    fail: bool,
}

impl RecordingStore {
    fn failing() -> Self {
        Self {
            records: Arc::default(),
            fail: true,
        }
    }
}

#[async_trait]
impl SummaryStore for RecordingStore {
    async fn insert(&self, record: &SummaryRecord) -> Result<(), StoreError> {
        self.records.lock().await.push(record.clone());
        if self.fail {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

#[derive(Clone)]
struct WebhookState {
    body: Value,
    tx: Arc<Mutex<Option<oneshot::Sender<Value>>>>,
}

async fn handle_webhook(
    State(state): State<WebhookState>,
    Json(request): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send(request);
    }
    (StatusCode::OK, Json(state.body))
}

async fn spawn_webhook(body: Value) -> (Url, oneshot::Receiver<Value>) {
    let (tx, rx) = oneshot::channel();
    let state = WebhookState {
        body,
        tx: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route("/webhook/chat", post(handle_webhook))
        .with_state(state);
    let base = spawn_server(app).await.expect("spawn webhook");
    let endpoint = Url::parse(&format!("{base}/webhook/chat")).expect("endpoint");
    (endpoint, rx)
}

fn workflow_for(endpoint: Url, store: RecordingStore) -> SummarizeWorkflow {
    SummarizeWorkflow::new(
        Arc::new(WebhookSummarizer::new(endpoint)),
        Arc::new(store),
    )
}

#[tokio::test]
async fn posts_trimmed_input_with_send_message_action() {
    let (endpoint, request_rx) = spawn_webhook(json!({ "summary": "x y" })).await;
    let workflow = workflow_for(endpoint, RecordingStore::default());

    workflow.run("  read this post  ").await.expect("ran");

    let request = request_rx.await.expect("request");
    assert_eq!(
        request,
        json!({ "chatInput": "read this post", "action": "sendMessage" })
    );
}

#[tokio::test]
async fn summary_field_drives_result_and_word_counts() {
    let (endpoint, _rx) = spawn_webhook(json!({ "summary": "x y" })).await;
    let workflow = workflow_for(endpoint, RecordingStore::default());

    let outcome = workflow.run("  a  b c ").await.expect("ran");

    assert!(matches!(outcome, WorkflowOutcome::Done(_)));
    let result = outcome.result();
    assert_eq!(result.original_word_count, 3);
    assert_eq!(result.summary_text, "x y");
    assert_eq!(result.summary_word_count, 2);
    assert_eq!(workflow.phase().await, WorkflowPhase::Done);
    assert!(!workflow.is_loading());
}

#[tokio::test]
async fn message_field_used_without_summary() {
    let (endpoint, _rx) = spawn_webhook(json!({ "message": "hello" })).await;
    let workflow = workflow_for(endpoint, RecordingStore::default());

    let outcome = workflow.run("some text").await.expect("ran");
    assert_eq!(outcome.result().summary_text, "hello");
    assert_eq!(outcome.result().summary_word_count, 1);
}

#[tokio::test]
async fn bare_string_body_used_verbatim() {
    let (endpoint, _rx) = spawn_webhook(json!("ok")).await;
    let workflow = workflow_for(endpoint, RecordingStore::default());

    let outcome = workflow.run("some text").await.expect("ran");
    assert_eq!(outcome.result().summary_text, "ok");
}

#[tokio::test]
async fn persists_untrimmed_input_with_extracted_summary() {
    let (endpoint, _rx) = spawn_webhook(json!({ "summary": "short" })).await;
    let store = RecordingStore::default();
    let workflow = workflow_for(endpoint, store.clone());

    workflow.run("  long article body ").await.expect("ran");

    let records = store.records.lock().await;
    assert_eq!(
        *records,
        vec![SummaryRecord {
            content: "  long article body ".into(),
            summary: "short".into(),
        }]
    );
}

#[tokio::test]
async fn store_failure_does_not_fail_workflow() {
    let (endpoint, _rx) = spawn_webhook(json!({ "summary": "still fine" })).await;
    let workflow = workflow_for(endpoint, RecordingStore::failing());

    let outcome = workflow.run("text").await.expect("ran");
    assert!(matches!(outcome, WorkflowOutcome::Done(_)));
    assert_eq!(outcome.result().summary_text, "still fine");
}

#[tokio::test]
async fn non_success_status_with_json_body_is_still_parsed() {
    let app = Router::new().route(
        "/chat",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Workflow could not be started" })),
            )
        }),
    );
    let base = spawn_server(app).await.expect("spawn");
    let endpoint = Url::parse(&format!("{base}/chat")).expect("endpoint");
    let workflow = workflow_for(endpoint, RecordingStore::default());

    let outcome = workflow.run("text").await.expect("ran");
    assert_eq!(
        outcome.result().summary_text,
        "Workflow could not be started"
    );
}

#[tokio::test]
async fn non_json_body_yields_error_marker_and_skips_store() {
    let app = Router::new().route("/chat", post(|| async { "<html>bad gateway</html>" }));
    let base = spawn_server(app).await.expect("spawn");
    let endpoint = Url::parse(&format!("{base}/chat")).expect("endpoint");
    let store = RecordingStore::default();
    let workflow = workflow_for(endpoint, store.clone());

    let outcome = workflow.run("one two three four").await.expect("ran");

    match &outcome {
        WorkflowOutcome::Failed { result, error } => {
            assert_eq!(result.summary_text, SUMMARY_ERROR_MARKER);
            assert_eq!(result.original_word_count, 4);
            assert_eq!(result.summary_word_count, 0);
            assert_eq!(error.code, ErrorCode::MalformedResponse);
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(workflow.phase().await, WorkflowPhase::Failed);
    assert!(!workflow.is_loading());
    assert!(store.records.lock().await.is_empty());
}

#[tokio::test]
async fn non_text_summary_yields_error_marker_and_skips_store() {
    let (endpoint, _rx) =
        spawn_webhook(json!({ "summary": { "text": "x" }, "message": "ok" })).await;
    let store = RecordingStore::default();
    let workflow = workflow_for(endpoint, store.clone());

    let outcome = workflow.run("one two").await.expect("ran");

    match &outcome {
        WorkflowOutcome::Failed { result, error } => {
            assert_eq!(result.summary_text, SUMMARY_ERROR_MARKER);
            assert_eq!(result.original_word_count, 2);
            assert_eq!(result.summary_word_count, 0);
            assert_eq!(error.code, ErrorCode::MalformedResponse);
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(workflow.phase().await, WorkflowPhase::Failed);
    assert!(!workflow.is_loading());
    assert!(store.records.lock().await.is_empty());
}

#[tokio::test]
async fn unreachable_endpoint_yields_error_marker() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let endpoint = Url::parse(&format!("http://{addr}/chat")).expect("endpoint");
    let workflow = workflow_for(endpoint, RecordingStore::default());

    let outcome = workflow.run("text").await.expect("ran");

    match outcome {
        WorkflowOutcome::Failed { result, error } => {
            assert!(result.is_error_marker());
            assert_eq!(error.code, ErrorCode::Network);
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(!workflow.is_loading());
}

#[tokio::test]
async fn blank_input_is_not_sent() {
    let workflow = SummarizeWorkflow::new(
        Arc::new(PanickingSummarizer),
        Arc::new(MissingSummaryStore),
    );
    assert!(workflow.run("   \n\t ").await.is_none());
    assert_eq!(workflow.phase().await, WorkflowPhase::Idle);
}

struct PanickingSummarizer;

#[async_trait]
impl Summarizer for PanickingSummarizer {
    async fn summarize(&self, _request: &SummarizeRequest) -> Result<Value, WebhookError> {
        panic!("summarizer must not be called");
    }
}

/// Holds every call until released, so a run can be observed in flight.
struct GatedSummarizer {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl Summarizer for GatedSummarizer {
    async fn summarize(&self, _request: &SummarizeRequest) -> Result<Value, WebhookError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(json!({ "summary": "done" }))
    }
}

#[tokio::test]
async fn second_run_while_loading_is_a_no_op() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let workflow = Arc::new(SummarizeWorkflow::new(
        Arc::new(GatedSummarizer {
            entered: entered.clone(),
            release: release.clone(),
        }),
        Arc::new(MissingSummaryStore),
    ));

    let first = tokio::spawn({
        let workflow = workflow.clone();
        async move { workflow.run("first input").await }
    });
    entered.notified().await;

    assert!(workflow.is_loading());
    assert_eq!(workflow.phase().await, WorkflowPhase::Running);
    assert!(workflow.run("second input").await.is_none());

    release.notify_one();
    let outcome = tokio::time::timeout(Duration::from_secs(5), first)
        .await
        .expect("first run finished")
        .expect("join")
        .expect("ran");
    assert_eq!(outcome.result().summary_text, "done");
    assert!(!workflow.is_loading());
}
