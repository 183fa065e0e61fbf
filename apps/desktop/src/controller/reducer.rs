//! Page state and its transitions. Pure: no I/O happens here.

use std::time::Duration;

use shared::domain::{InputMode, InputState, SummaryResult};

use crate::controller::events::{PageEffect, UiEvent};

pub const FACTS: [&str; 5] = [
    "💡 Summaries boost retention by 30%.",
    "⏱️ Average reader saves 6 min per article.",
    "🌎 This app supports 40+ languages.",
    "📊 AI cuts word‑count ~85% on avg.",
    "🔒 Summaries are stored securely in Supabase.",
];

#[derive(Debug, Clone)]
pub struct PageState {
    pub input: InputState,
    pub loading: bool,
    pub result: Option<SummaryResult>,
    pub about_open: bool,
    pub fact_index: usize,
    pub signed_in_as: Option<String>,
    pub login_error: Option<String>,
    scroll_delay: Duration,
}

impl PageState {
    pub fn new(scroll_delay: Duration) -> Self {
        Self {
            input: InputState::default(),
            loading: false,
            result: None,
            about_open: false,
            fact_index: 0,
            signed_in_as: None,
            login_error: None,
            scroll_delay,
        }
    }

    pub fn can_run(&self) -> bool {
        !self.input.is_blank() && !self.loading
    }

    pub fn current_fact(&self) -> &'static str {
        FACTS[self.fact_index % FACTS.len()]
    }

    pub fn apply(&mut self, event: UiEvent) -> Vec<PageEffect> {
        match event {
            UiEvent::ModeSelected(mode) => {
                self.select_mode(mode);
                Vec::new()
            }
            UiEvent::InputChanged(text) => {
                self.input.raw_text = text;
                Vec::new()
            }
            UiEvent::SummarizeRequested => {
                if !self.can_run() {
                    return Vec::new();
                }
                self.loading = true;
                self.result = None;
                vec![
                    PageEffect::ShowProgress,
                    PageEffect::StartSummarize {
                        raw_input: self.input.raw_text.clone(),
                    },
                ]
            }
            UiEvent::SummaryFinished(outcome) => {
                self.loading = false;
                self.result = Some(outcome.into_result());
                vec![PageEffect::ScrollToSummary {
                    after: self.scroll_delay,
                }]
            }
            UiEvent::SummaryAbandoned => {
                self.loading = false;
                Vec::new()
            }
            UiEvent::LoginRequested { email, password } => {
                self.login_error = None;
                if email.trim().is_empty() || password.is_empty() {
                    let message = "Email and password are required".to_string();
                    self.login_error = Some(message.clone());
                    return vec![PageEffect::ShowLoginError(message)];
                }
                vec![PageEffect::SignIn { email, password }]
            }
            UiEvent::LoginFinished(Ok(email)) => {
                self.signed_in_as = Some(email.clone());
                self.login_error = None;
                vec![PageEffect::NavigateHome { email }]
            }
            UiEvent::LoginFinished(Err(message)) => {
                self.login_error = Some(message.clone());
                vec![PageEffect::ShowLoginError(message)]
            }
            UiEvent::CopyRequested => match &self.result {
                Some(result) if !self.loading => vec![PageEffect::CopyToClipboard {
                    text: result.summary_text.clone(),
                }],
                _ => Vec::new(),
            },
            UiEvent::AboutToggled => {
                self.about_open = !self.about_open;
                if self.about_open {
                    vec![PageEffect::ShowAbout]
                } else {
                    Vec::new()
                }
            }
            UiEvent::AboutDismissed => {
                self.about_open = false;
                Vec::new()
            }
            UiEvent::FactAdvanced => {
                self.fact_index = (self.fact_index + 1) % FACTS.len();
                Vec::new()
            }
        }
    }

    /// Resets input and output, even when `mode` is already active.
    fn select_mode(&mut self, mode: InputMode) {
        self.input.select_mode(mode);
        self.result = None;
    }
}

#[cfg(test)]
#[path = "../tests/reducer_tests.rs"]
mod tests;
