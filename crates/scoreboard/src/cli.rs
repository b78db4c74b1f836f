//! Command-line interface for the scoreboard server.

use clap::{Parser, Subcommand};

/// Scoreboard - win/lose score tracking over HTTP
#[derive(Parser, Debug)]
#[command(name = "scoreboard")]
#[command(about = "Scoreboard HTTP service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true, default_value = "scoreboard.toml")]
    pub config: std::path::PathBuf,

    /// SQLite database path (overrides config and environment)
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply the schema and serve the HTTP API
    Serve {
        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },

    /// Apply the schema and exit
    Migrate,
}
