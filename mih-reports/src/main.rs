//! mih-reports - Read-only reporting service
//!
//! Serves aggregate reports and CSV exports over the database written by
//! mih-ingest. Never writes.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use mih_common::config::{
    default_config_path, load_toml_config, CompiledDefaults, RootFolderInitializer,
    RootFolderResolver,
};
use mih_reports::{build_router, AppState};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "mih-reports")]
#[command(about = "Music Insights Hub reporting service")]
#[command(version)]
struct Args {
    /// Root folder holding the database (overrides MIH_ROOT_FOLDER)
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// HTTP port to listen on
    #[arg(short, long, env = "MIH_REPORTS_PORT")]
    port: Option<u16>,

    /// Path to the TOML bootstrap file
    #[arg(long, env = "MIH_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let defaults = CompiledDefaults::for_current_platform();

    let config_path = args.config.clone().or_else(default_config_path);
    let toml_config = match &config_path {
        Some(path) => load_toml_config(path)?,
        None => Default::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level)),
        )
        .init();

    // Build identification first, before any database delay
    info!(
        "Starting mih-reports (Reporting) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = RootFolderResolver::new("mih-reports")
        .with_cli_arg(args.root_folder)
        .with_toml(&toml_config)
        .resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match mih_reports::db::connect_readonly(&db_path).await {
        Ok(pool) => {
            info!("Connected to database (read-only)");
            pool
        }
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e);
        }
    };

    let app = build_router(AppState::new(pool));

    let port = args
        .port
        .or(toml_config.reports.port)
        .unwrap_or(defaults.reports_port);
    let bind_addr = format!("127.0.0.1:{}", port);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("mih-reports listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
