use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    AuthProvider, MissingAuthProvider, MissingSummaryStore, PasswordAuthClient, RestSummaryStore,
    SummarizeWorkflow, SummaryStore, WebhookSummarizer,
};
use shared::domain::InputMode;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod controller;
mod ui;

use config::{load_settings, Settings, SETTINGS_FILE};
use controller::{
    events::UiEvent,
    orchestration::{PageDriver, Services},
    reducer::PageState,
};
use ui::{render::TerminalPresenter, session::run_interactive};

#[derive(Parser, Debug)]
#[command(name = "blog-summarizer", about = "Summarize a blog post from its URL or text")]
struct Cli {
    /// Settings file (flat TOML keys).
    #[arg(long, default_value = SETTINGS_FILE)]
    config: PathBuf,
    /// Overrides the summarizer webhook endpoint.
    #[arg(long)]
    webhook_url: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize once and exit. Use `-` to read the input from stdin.
    Summarize {
        #[arg(long, default_value = "url")]
        mode: InputMode,
        /// Copy the summary to the clipboard.
        #[arg(long)]
        copy: bool,
        #[arg(required = true, num_args = 1..)]
        input: Vec<String>,
    },
    /// Sign in with email and password.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Interactive page (default).
    Interactive,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config);
    if let Some(url) = cli.webhook_url {
        settings.webhook_url = url;
    }

    let services = build_services(&settings)?;
    let state = PageState::new(settings.scroll_delay());
    let mut driver = PageDriver::new(state, services, TerminalPresenter::stdout());

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Summarize { mode, copy, input } => {
            let raw_input = read_input(input).await?;
            driver.dispatch(UiEvent::ModeSelected(mode)).await;
            driver.dispatch(UiEvent::InputChanged(raw_input)).await;
            driver.dispatch(UiEvent::SummarizeRequested).await;

            let Some(result) = driver.state().result.clone() else {
                eprintln!("Nothing to summarize: input is empty.");
                return Ok(ExitCode::FAILURE);
            };
            if result.is_error_marker() {
                return Ok(ExitCode::FAILURE);
            }
            if copy {
                driver.dispatch(UiEvent::CopyRequested).await;
            }
        }
        Command::Login { email, password } => {
            driver
                .dispatch(UiEvent::LoginRequested { email, password })
                .await;
            if driver.state().signed_in_as.is_none() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Interactive => {
            run_interactive(&mut driver, settings.fact_rotation()).await?;
        }
    }
    driver
        .presenter_mut()
        .finish()
        .context("failed to write to stdout")?;

    Ok(ExitCode::SUCCESS)
}

fn build_services(settings: &Settings) -> Result<Services> {
    let endpoint = settings.webhook_endpoint()?;
    info!(%endpoint, "using summarizer webhook");

    let credentials = settings.store_credentials()?;
    if credentials.is_none() {
        warn!("store url or key not configured; summaries will not be saved and sign-in is disabled");
    }

    let store = credentials.clone().map(|credentials| {
        Arc::new(RestSummaryStore::new(
            credentials,
            settings.summaries_table.clone(),
        ))
    });
    let auth: Arc<dyn AuthProvider> = match credentials {
        Some(credentials) => Arc::new(PasswordAuthClient::new(credentials)),
        None => Arc::new(MissingAuthProvider),
    };
    let store_for_workflow: Arc<dyn SummaryStore> = match &store {
        Some(store) => store.clone() as Arc<dyn SummaryStore>,
        None => Arc::new(MissingSummaryStore),
    };
    let workflow = SummarizeWorkflow::new(
        Arc::new(WebhookSummarizer::new(endpoint)),
        store_for_workflow,
    );

    Ok(Services {
        workflow: Arc::new(workflow),
        auth,
        store,
    })
}

async fn read_input(input: Vec<String>) -> Result<String> {
    if input.len() == 1 && input[0] == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("failed to read input from stdin")?;
        return Ok(buf);
    }
    Ok(input.join(" "))
}
