//! Interactive terminal page: one line in, one round of events out. The fact
//! ticker shares the same loop so page state is only touched from one place.

use std::{io::Write, time::Duration};

use anyhow::Context;
use shared::domain::InputMode;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    time::{interval_at, Instant, MissedTickBehavior},
};

use crate::{
    controller::{
        events::UiEvent,
        orchestration::{PageDriver, Presenter},
    },
    ui::render::TerminalPresenter,
};

const PASTE_TERMINATOR: &str = ".";

#[derive(Debug, Clone)]
pub enum SessionCommand {
    Events(Vec<UiEvent>),
    BeginPaste,
    Help,
    Quit,
    Unknown(String),
    Ignore,
}

pub fn parse_command(line: &str) -> SessionCommand {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return SessionCommand::Ignore;
    }
    if !trimmed.starts_with('/') {
        return outside_about(vec![
            UiEvent::InputChanged(line.to_string()),
            UiEvent::SummarizeRequested,
        ]);
    }

    let (command, rest) = trimmed
        .split_once(char::is_whitespace)
        .map(|(c, r)| (c, r.trim_start()))
        .unwrap_or((trimmed, ""));

    match command {
        "/quit" | "/exit" => SessionCommand::Quit,
        "/help" => SessionCommand::Help,
        "/paste" => SessionCommand::BeginPaste,
        "/url" => outside_about(vec![UiEvent::ModeSelected(InputMode::Url)]),
        "/text" => outside_about(vec![UiEvent::ModeSelected(InputMode::Text)]),
        "/copy" => outside_about(vec![UiEvent::CopyRequested]),
        "/about" => SessionCommand::Events(vec![UiEvent::AboutToggled]),
        "/login" => {
            let (email, password) = rest
                .split_once(char::is_whitespace)
                .unwrap_or((rest, ""));
            outside_about(vec![UiEvent::LoginRequested {
                email: email.to_string(),
                password: password.to_string(),
            }])
        }
        other => SessionCommand::Unknown(other.to_string()),
    }
}

fn outside_about(mut events: Vec<UiEvent>) -> SessionCommand {
    events.insert(0, UiEvent::AboutDismissed);
    SessionCommand::Events(events)
}

pub async fn run_interactive<W: Write>(
    driver: &mut PageDriver<TerminalPresenter<W>>,
    fact_rotation: Duration,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = interval_at(Instant::now() + fact_rotation, fact_rotation);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut paste: Option<String> = None;

    driver.presenter_mut().banner();
    prompt(driver)?;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                driver.dispatch(UiEvent::FactAdvanced).await;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    break;
                };

                if let Some(buffer) = paste.as_mut() {
                    if line.trim() != PASTE_TERMINATOR {
                        buffer.push_str(&line);
                        buffer.push('\n');
                        continue;
                    }
                    let text = paste.take().unwrap_or_default();
                    for event in [
                        UiEvent::AboutDismissed,
                        UiEvent::InputChanged(text),
                        UiEvent::SummarizeRequested,
                    ] {
                        driver.dispatch(event).await;
                    }
                    prompt(driver)?;
                    continue;
                }

                match parse_command(&line) {
                    SessionCommand::Quit => break,
                    SessionCommand::Help => driver.presenter_mut().help(),
                    SessionCommand::BeginPaste => {
                        if driver.state().input.mode != InputMode::Text {
                            driver.dispatch(UiEvent::ModeSelected(InputMode::Text)).await;
                        }
                        paste = Some(String::new());
                        driver.presenter_mut().notice(&format!(
                            "Paste text, then a line with only '{PASTE_TERMINATOR}':"
                        ));
                        continue;
                    }
                    SessionCommand::Unknown(command) => {
                        driver
                            .presenter_mut()
                            .notice(&format!("Unknown command {command}; type /help"));
                    }
                    SessionCommand::Events(events) => {
                        for event in events {
                            driver.dispatch(event).await;
                        }
                    }
                    SessionCommand::Ignore => {}
                }
                prompt(driver)?;
            }
        }
    }

    Ok(())
}

fn prompt<W: Write>(driver: &mut PageDriver<TerminalPresenter<W>>) -> anyhow::Result<()> {
    let state = driver.state().clone();
    driver
        .presenter_mut()
        .prompt(&state)
        .context("failed to write to the terminal")
}

#[cfg(test)]
#[path = "../tests/session_tests.rs"]
mod tests;
