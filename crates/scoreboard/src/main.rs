//! Scoreboard - HTTP server binary
//!
//! Loads configuration, prepares the database and serves the API.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use scoreboard::{AppState, ScoreRepository, ScoreService, ServerConfig, app};
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    initialize_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { port, host } => {
            let config = ServerConfig::load(Some(cli.config.as_path()))?.with_overrides(
                host,
                port,
                cli.database_url,
            );
            run_server(config).await
        }
        Command::Migrate => {
            let config = ServerConfig::load(Some(cli.config.as_path()))?.with_overrides(
                None,
                None,
                cli.database_url,
            );
            open_repository(&config)?;
            info!("Schema is up to date");
            Ok(())
        }
    }
}

/// Opens the pool and applies any pending migrations.
#[instrument(skip(config), fields(database_url = %config.database_url()))]
fn open_repository(config: &ServerConfig) -> Result<ScoreRepository> {
    let repository = ScoreRepository::new(config.database_url().clone(), *config.pool_size())?;
    repository.run_migrations()?;
    Ok(repository)
}

/// Run the HTTP server until Ctrl+C.
#[instrument(skip(config))]
async fn run_server(config: ServerConfig) -> Result<()> {
    let repository = open_repository(&config)?;
    let state = AppState::new(ScoreService::new(repository));
    let app = app(state, config.cors_origins())?;

    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!(
        addr = %listener.local_addr()?,
        "Scoreboard ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,scoreboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
