use serde::{Deserialize, Serialize};

/// Text shown in place of a summary when the webhook call fails.
pub const SUMMARY_ERROR_MARKER: &str = "❌ Error — please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    #[default]
    Url,
    Text,
}

impl InputMode {
    pub const ALL: [InputMode; 2] = [InputMode::Url, InputMode::Text];

    pub fn label(self) -> &'static str {
        match self {
            InputMode::Url => "URL",
            InputMode::Text => "TEXT",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            InputMode::Url => "Enter blog URL…",
            InputMode::Text => "Paste blog text…",
        }
    }
}

impl std::str::FromStr for InputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("url") {
            Ok(InputMode::Url)
        } else if s.eq_ignore_ascii_case("text") {
            Ok(InputMode::Text)
        } else {
            Err(format!("unknown input mode '{s}' (expected 'url' or 'text')"))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    pub mode: InputMode,
    pub raw_text: String,
}

impl InputState {
    /// Switching mode always drops whatever was typed, even for the same mode.
    pub fn select_mode(&mut self, mode: InputMode) {
        self.mode = mode;
        self.raw_text.clear();
    }

    pub fn trimmed(&self) -> &str {
        self.raw_text.trim()
    }

    pub fn is_blank(&self) -> bool {
        self.trimmed().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub original_word_count: usize,
    pub summary_text: String,
    pub summary_word_count: usize,
}

impl SummaryResult {
    pub fn completed(original_word_count: usize, summary_text: impl Into<String>) -> Self {
        let summary_text = summary_text.into();
        Self {
            original_word_count,
            summary_word_count: word_count(&summary_text),
            summary_text,
        }
    }

    /// The marker is never counted as summary words.
    pub fn failed(original_word_count: usize) -> Self {
        Self {
            original_word_count,
            summary_text: SUMMARY_ERROR_MARKER.to_string(),
            summary_word_count: 0,
        }
    }

    pub fn is_error_marker(&self) -> bool {
        self.summary_text == SUMMARY_ERROR_MARKER
    }
}

/// Number of whitespace-delimited tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
