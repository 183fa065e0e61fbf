//! Page events and the effects the reducer asks the driver to perform.

use std::time::Duration;

use client_core::WorkflowOutcome;
use shared::domain::InputMode;

#[derive(Debug, Clone)]
pub enum UiEvent {
    ModeSelected(InputMode),
    InputChanged(String),
    SummarizeRequested,
    SummaryFinished(WorkflowOutcome),
    /// The workflow refused the run (blank input or already in flight).
    SummaryAbandoned,
    LoginRequested {
        email: String,
        password: String,
    },
    /// `Ok` carries the signed-in email, `Err` the provider message.
    LoginFinished(Result<String, String>),
    CopyRequested,
    AboutToggled,
    /// Any interaction outside the about panel closes it.
    AboutDismissed,
    FactAdvanced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEffect {
    ShowProgress,
    StartSummarize { raw_input: String },
    ScrollToSummary { after: Duration },
    SignIn { email: String, password: String },
    NavigateHome { email: String },
    ShowLoginError(String),
    CopyToClipboard { text: String },
    ShowAbout,
}
