use std::io::{self, Write};

use arboard::Clipboard;
use shared::domain::{InputMode, SummaryResult};

use crate::controller::{orchestration::Presenter, reducer::PageState};

pub const ABOUT_TEXT: &str = "What’s this?\n\
Blog Summarizer turns long articles into short, clear insights using AI.";

pub const HELP_TEXT: &str = "Commands:
  /url                 switch to URL input (clears input and summary)
  /text                switch to text input (clears input and summary)
  /paste               start multi-line text; finish with a line containing only '.'
  /login <email> <pw>  sign in
  /copy                copy the last summary to the clipboard
  /about               toggle the about panel
  /help                show this help
  /quit                exit
Anything else is summarized as input for the current mode.";

pub fn format_summary(result: &SummaryResult) -> String {
    format!(
        "📊 {} → {} words\n{}",
        result.original_word_count, result.summary_word_count, result.summary_text
    )
}

pub fn format_prompt(state: &PageState) -> String {
    let mode = state.input.mode;
    let tabs = InputMode::ALL
        .iter()
        .map(|m| {
            if *m == mode {
                format!("[{}]", m.label())
            } else {
                m.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let user = match (&state.signed_in_as, &state.login_error) {
        (Some(email), _) => format!(" · {email}"),
        (None, Some(_)) => " · not signed in".to_string(),
        (None, None) => String::new(),
    };
    format!(
        "{}\n{tabs}{user} {} > ",
        state.current_fact(),
        mode.placeholder()
    )
}

/// Writes the page to a terminal. The first write error is held until the
/// next [`TerminalPresenter::prompt`] or [`TerminalPresenter::finish`].
pub struct TerminalPresenter<W> {
    out: W,
    write_error: Option<io::Error>,
}

impl TerminalPresenter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            write_error: None,
        }
    }

    pub fn prompt(&mut self, state: &PageState) -> io::Result<()> {
        let written = write!(self.out, "{}", format_prompt(state));
        self.record(written);
        self.finish()
    }

    /// Flushes output and reports the first write failure since the last call.
    pub fn finish(&mut self) -> io::Result<()> {
        let flushed = self.out.flush();
        self.record(flushed);
        self.write_error.take().map_or(Ok(()), Err)
    }

    pub fn help(&mut self) {
        self.line(HELP_TEXT);
    }

    pub fn banner(&mut self) {
        self.line("📝 Blog Summarizer\nPaste a URL or blog text to generate a summary. Type /help for commands.");
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        let written = writeln!(self.out, "{text}");
        self.record(written);
    }

    fn record(&mut self, written: io::Result<()>) {
        if let Err(err) = written {
            self.write_error.get_or_insert(err);
        }
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn progress(&mut self, _mode: InputMode) {
        self.line("Summarizing…");
    }

    fn summary(&mut self, result: &SummaryResult) {
        self.line(&format!("\n{}\n", format_summary(result)));
    }

    fn about(&mut self) {
        self.line(ABOUT_TEXT);
    }

    fn home(&mut self, email: &str) {
        self.line(&format!("Signed in as {email}."));
    }

    fn login_error(&mut self, message: &str) {
        self.line(&format!("Login failed: {message}"));
    }

    fn notice(&mut self, message: &str) {
        self.line(message);
    }

    fn copy_to_clipboard(&mut self, text: &str) -> anyhow::Result<()> {
        let mut clipboard = Clipboard::new()?;
        clipboard.set_text(text.to_string())?;
        Ok(())
    }
}
