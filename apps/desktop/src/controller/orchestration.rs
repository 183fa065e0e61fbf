//! Runs page effects against the backend services and feeds results back
//! into the reducer.

use std::{collections::VecDeque, sync::Arc};

use client_core::{AuthProvider, RestSummaryStore, SummarizeWorkflow, WorkflowOutcome};
use shared::domain::{InputMode, SummaryResult};
use tracing::{debug, warn};

use crate::controller::{
    events::{PageEffect, UiEvent},
    reducer::PageState,
};

/// Output side of the page. The terminal implementation lives in `ui`.
pub trait Presenter {
    fn progress(&mut self, mode: InputMode);
    fn summary(&mut self, result: &SummaryResult);
    fn about(&mut self);
    fn home(&mut self, email: &str);
    fn login_error(&mut self, message: &str);
    fn notice(&mut self, message: &str);
    fn copy_to_clipboard(&mut self, text: &str) -> anyhow::Result<()>;
}

pub struct Services {
    pub workflow: Arc<SummarizeWorkflow>,
    pub auth: Arc<dyn AuthProvider>,
    /// Present when persistence is configured; receives the session token
    /// after sign-in.
    pub store: Option<Arc<RestSummaryStore>>,
}

pub struct PageDriver<P> {
    state: PageState,
    services: Services,
    presenter: P,
}

impl<P: Presenter> PageDriver<P> {
    pub fn new(state: PageState, services: Services, presenter: P) -> Self {
        Self {
            state,
            services,
            presenter,
        }
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub async fn dispatch(&mut self, event: UiEvent) {
        let mut pending: VecDeque<PageEffect> = self.state.apply(event).into();
        while let Some(effect) = pending.pop_front() {
            if let Some(follow_up) = self.perform(effect).await {
                pending.extend(self.state.apply(follow_up));
            }
        }
    }

    async fn perform(&mut self, effect: PageEffect) -> Option<UiEvent> {
        debug!(?effect, "performing page effect");
        match effect {
            PageEffect::ShowProgress => {
                self.presenter.progress(self.state.input.mode);
                None
            }
            PageEffect::StartSummarize { raw_input } => {
                match self.services.workflow.run(&raw_input).await {
                    Some(outcome) => {
                        if let WorkflowOutcome::Failed { error, .. } = &outcome {
                            warn!(%error, "showing error marker instead of a summary");
                        }
                        Some(UiEvent::SummaryFinished(outcome))
                    }
                    None => Some(UiEvent::SummaryAbandoned),
                }
            }
            PageEffect::ScrollToSummary { after } => {
                tokio::time::sleep(after).await;
                if let Some(result) = &self.state.result {
                    self.presenter.summary(result);
                }
                None
            }
            PageEffect::SignIn { email, password } => {
                match self
                    .services
                    .auth
                    .sign_in_with_password(&email, &password)
                    .await
                {
                    Ok(session) => {
                        if let Some(store) = &self.services.store {
                            store
                                .set_access_token(Some(session.access_token.clone()))
                                .await;
                        }
                        Some(UiEvent::LoginFinished(Ok(session
                            .email
                            .unwrap_or_else(|| email.trim().to_string()))))
                    }
                    Err(err) => Some(UiEvent::LoginFinished(Err(err.to_string()))),
                }
            }
            PageEffect::NavigateHome { email } => {
                self.presenter.home(&email);
                None
            }
            PageEffect::ShowLoginError(message) => {
                self.presenter.login_error(&message);
                None
            }
            PageEffect::CopyToClipboard { text } => {
                match self.presenter.copy_to_clipboard(&text) {
                    Ok(()) => self.presenter.notice("📋 Copied!"),
                    Err(err) => {
                        warn!(error = %err, "clipboard copy failed");
                        self.presenter.notice(&format!("Copy failed: {err}"));
                    }
                }
                None
            }
            PageEffect::ShowAbout => {
                self.presenter.about();
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/orchestration_tests.rs"]
mod tests;
