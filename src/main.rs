//! Gridfade - fading tic-tac-toe session server
//!
//! Serves the game API over HTTP and offers a polling watcher for
//! debugging sessions from the terminal.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use gridfade::{
    ApiClient, AppState, Board, MemoryDirectory, ServerConfig, SessionManager, SessionStatus,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Command::Serve { host, port, config } => run_server(host, port, config).await,
        Command::Watch {
            code,
            server_url,
            interval_ms,
        } => run_watch(code, server_url, interval_ms).await,
    }
}

/// Run the HTTP game server with the background session sweep.
async fn run_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<std::path::PathBuf>,
) -> Result<()> {
    let config = match config_path {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    }
    .with_bind(host, port);

    info!("Starting gridfade server");

    let sessions = SessionManager::new();
    let users = Arc::new(MemoryDirectory::new());
    let state = AppState::new(sessions.clone(), users);

    spawn_session_sweep(&sessions, &config);

    gridfade::serve(&config, state).await
}

/// Spawns the collaborator-level TTL sweep for idle sessions.
fn spawn_session_sweep(sessions: &SessionManager, config: &ServerConfig) {
    let store = sessions.store().clone();
    let ttl = chrono::Duration::seconds(*config.session_ttl_secs() as i64);
    let interval = Duration::from_secs(*config.sweep_interval_secs());

    info!(
        ttl_secs = *config.session_ttl_secs(),
        interval_secs = *config.sweep_interval_secs(),
        "Starting session sweep task"
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it so a restart never
        // races fresh sessions.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = store.sweep_expired(ttl);
            debug!(removed, "Session sweep completed");
        }
    });
}

/// Poll a session and print each new snapshot until it finishes.
async fn run_watch(code: String, server_url: String, interval_ms: u64) -> Result<()> {
    let client = ApiClient::new(server_url);
    let interval = Duration::from_millis(interval_ms);
    let mut seen_version = 0;

    info!(code = %code, "Watching session");

    loop {
        let snapshot = client.wait_for_update(&code, seen_version, interval).await?;
        seen_version = snapshot.version;

        println!(
            "[v{}] {} vs {} | status: {:?} | turn: {}",
            snapshot.version,
            snapshot.player1_email,
            snapshot.player2_email.as_deref().unwrap_or("(waiting)"),
            snapshot.status,
            snapshot.current_turn,
        );
        println!("{}", Board::from_cells(&snapshot.board).display());
        if let Some(fading) = snapshot.fading_position {
            println!("fading next: {}", fading);
        }

        if snapshot.status == SessionStatus::Finished {
            if let Some(winner) = snapshot.winner {
                println!("game over: {:?}", winner);
            }
            return Ok(());
        }
    }
}
