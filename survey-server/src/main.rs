//! survey-server - survey authoring and reply service
//!
//! `serve` (the default) runs the HTTP API; `add-admin` creates an
//! administrator account in the database and exits.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use survey_common::config::ServerConfig;
use survey_common::db;
use survey_server::{build_router, AppState};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "survey-server", version, about = "Survey authoring and reply service")]
struct Args {
    /// SQLite database file
    #[arg(long, env = "SURVEY_DB", global = true)]
    database: Option<PathBuf>,

    /// Listen address (host:port)
    #[arg(long, env = "SURVEY_BIND", global = true)]
    bind: Option<String>,

    /// TOML config file
    #[arg(long, env = "SURVEY_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Create an administrator account
    AddAdmin {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ServerConfig::resolve(
        args.database.as_deref(),
        args.bind.as_deref(),
        args.config.as_deref(),
    )
    .context("Failed to load configuration")?;

    // RUST_LOG wins over the config file
    let default_level = config.log_level.clone().unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!(
        "Starting survey-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Database path: {}", config.database_path.display());

    let pool = match db::init_database(&config.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e).context("Database initialization failed");
        }
    };

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let state = AppState::with_session_ttl(pool, config.session_ttl);
            serve(state, &config.bind_addr).await
        }
        Command::AddAdmin { username, password } => {
            let admin_id = db::create_admin(&pool, &username, &password)
                .await
                .with_context(|| format!("Failed to create administrator '{}'", username))?;
            info!("Administrator '{}' ready (id {})", username, admin_id);
            Ok(())
        }
    }
}

async fn serve(state: AppState, bind_addr: &str) -> Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("survey-server listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
