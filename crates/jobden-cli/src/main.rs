//! JobDen CLI - browse and manage the job board from a terminal.
//!
//! The session is persisted between runs, so `jobden login` once and the
//! other commands reuse (and transparently refresh) the stored tokens.

mod commands;
mod output;

use std::io;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use jobden_core::auth::{FileSessionStore, KeyringSessionStore, SessionStore};
use jobden_core::config::SessionBackend;
use jobden_core::{ApiClient, ApiError, AuthEvent, Config};

use commands::Command;

#[derive(Parser)]
#[command(name = "jobden", version)]
#[command(about = "Command-line client for the JobDen job board")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// API base URL (overrides JOBDEN_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Print raw JSON instead of formatted output
    #[arg(long, global = true)]
    json: bool,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn open_store(config: &Config) -> Result<Arc<dyn SessionStore>> {
    Ok(match config.session_backend {
        SessionBackend::File => Arc::new(FileSessionStore::open(config.data_dir()?)?),
        SessionBackend::Keyring => Arc::new(KeyringSessionStore::open()?),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });

    let store = open_store(&config)?;
    let client = match cli.api_url {
        Some(url) => ApiClient::with_timeout(url, store, config.request_timeout())?,
        None => ApiClient::from_config(&config, store)?,
    };
    info!(base_url = client.base_url(), "JobDen CLI starting");

    let mut events = client.subscribe();
    if cli.command.uses_stored_session() {
        if let Err(e) = client.restore_session().await {
            warn!(error = %e, "Failed to restore session");
        }
    }
    let result = commands::run(cli.command, &client, &mut config, cli.json).await;

    loop {
        match events.try_recv() {
            Ok(AuthEvent::SessionExpired { redirect_to }) => {
                eprintln!("Your session has expired ({}). Run `jobden login` to sign in again.", redirect_to);
            }
            Ok(AuthEvent::TokensRefreshed) => info!("Session renewed"),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }

    if let Err(e) = result {
        match e.downcast_ref::<ApiError>() {
            Some(api_err) => eprintln!("Error: {}", api_err.user_message()),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
    Ok(())
}
