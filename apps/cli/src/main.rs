use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;
use vidintel_core::{
    BackendConfig, ConfigOverrides, HttpBackend, SessionController, SessionStatus, VideoFile,
};

mod interactive;
mod render;

#[derive(Parser)]
#[command(name = "vidintel")]
#[command(about = "Upload a video to a video-intelligence backend and ask questions about it")]
struct Cli {
    /// Backend base URL. Defaults to http://localhost:8000, or VIDINTEL_API_URL if set.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Give up on a request after this many seconds (0 waits forever)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload and process a video
    Upload {
        /// Video file
        file: PathBuf,
    },

    /// Ask a question about the processed video
    Search {
        /// e.g. "Find frame with 3 people" or "When did the car appear?"
        query: String,
    },

    /// Interactive session: open, upload, and query repeatedly
    Session {
        /// Video to select on start
        file: Option<PathBuf>,
    },
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn upload(mut ctl: SessionController, file: PathBuf) -> Result<ExitCode> {
    ctl.select_file(VideoFile::new(file));
    ctl.submit_video();

    let spinner = create_spinner(ctl.state().status_message().unwrap_or_default());
    ctl.settle().await;
    spinner.finish_and_clear();

    if let Some(status) = render::status_line(ctl.state()) {
        println!("{status}");
    }
    Ok(match ctl.state().status {
        SessionStatus::UploadError => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

async fn search(mut ctl: SessionController, query: String) -> Result<ExitCode> {
    ctl.set_query(query);
    if ctl.submit_query().is_none() {
        return Ok(ExitCode::SUCCESS);
    }

    let spinner = create_spinner("Searching...");
    ctl.settle().await;
    spinner.finish_and_clear();

    let block = render::results_block(ctl.state());
    if !block.is_empty() {
        println!("{block}");
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();

    let config = match BackendConfig::resolve(ConfigOverrides {
        base_url: cli.api_url,
        timeout_secs: cli.timeout_secs.map(|secs| secs.to_string()),
    }) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            return Ok(ExitCode::FAILURE);
        }
    };
    tracing::debug!(base_url = %config.base_url, timeout = ?config.request_timeout, "backend configured");

    let backend = Arc::new(HttpBackend::new(config)?);
    let ctl = SessionController::new(backend);

    match cli.command {
        Command::Upload { file } => upload(ctl, file).await,
        Command::Search { query } => search(ctl, query).await,
        Command::Session { file } => {
            interactive::run(ctl, file).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
