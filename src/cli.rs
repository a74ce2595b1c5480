//! Command-line interface for gridfade.

use clap::{Parser, Subcommand};

/// Gridfade - fading tic-tac-toe session server
#[derive(Parser, Debug)]
#[command(name = "gridfade")]
#[command(about = "Fading tic-tac-toe session server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,
    },

    /// Poll a session by code and print each new snapshot
    Watch {
        /// Join code of the session to watch
        code: String,

        /// Game server URL
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        server_url: String,

        /// Polling interval in milliseconds
        #[arg(long, default_value = "1000")]
        interval_ms: u64,
    },
}
