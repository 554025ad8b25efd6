//! querydeck - A keyboard-driven SQL console for the terminal
//!
//! This is the main entry point for the querydeck application.
//! The actual logic is in the library modules for better testability.

use anyhow::{Context, Result};
use clap::Parser;
use querydeck::api::HttpGateway;
use querydeck::app::App;
use querydeck::config::{self, API_URL_ENV, Settings};
use querydeck::dispatch::Dispatcher;
use querydeck::export::ExportSink;
use querydeck::session::{FileTokenStore, MemoryTokenStore, SessionController};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "querydeck", version, about)]
struct Cli {
    /// Backend API base URL (overrides config and QUERYDECK_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Settings file to use instead of ~/.querydeck/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs to this file (defaults to ~/.querydeck/querydeck.log)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_file.as_deref())?;

    let settings = load_settings(&cli)?;
    info!(api_url = %settings.api_url, "starting querydeck");

    let gateway = HttpGateway::from_settings(&settings).context("failed to build API client")?;
    let sink = ExportSink::new(settings.resolved_export_dir()?, settings.open_exports);
    let dispatcher = Dispatcher::new(Arc::new(gateway), sink);

    let session = SessionController::new(
        Box::new(FileTokenStore::default_location()?),
        Box::new(MemoryTokenStore::new()),
        settings.remember_session,
    );
    let mut app = App::new(session, &settings);
    let initial = app.restore_session();

    querydeck::tui::run(&mut app, &dispatcher, initial).await?;
    info!("querydeck exited");
    Ok(())
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let settings = match &cli.config {
        Some(path) => config::load_settings_from(path)
            .with_context(|| format!("failed to load {}", path.display()))?
            .with_api_url(std::env::var(API_URL_ENV).ok()),
        None => config::load_settings().context("failed to load settings")?,
    };
    Ok(settings.with_api_url(cli.api_url.clone()))
}

/// Log to a file; the terminal belongs to the UI. Filter with RUST_LOG.
fn init_logging(path: Option<&std::path::Path>) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config::config_dir()?.join("querydeck.log"),
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
