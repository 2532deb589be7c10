//! mih-ingest - CSV Ingestion Service
//!
//! **Module Identity:**
//! - Name: mih-ingest
//! - Port: 5741 (default)
//!
//! Accepts artist- and device-format royalty CSV uploads, stores the raw
//! artifact, and persists the decoded rows as one ingestion.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use mih_common::config::{
    default_config_path, load_toml_config, CompiledDefaults, RootFolderInitializer,
    RootFolderResolver,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use mih_ingest::ingest::{IngestionPipeline, UploadStore};
use mih_ingest::AppState;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "mih-ingest")]
#[command(about = "Music Insights Hub CSV ingestion service")]
#[command(version)]
struct Args {
    /// Root folder holding the database and uploads (overrides MIH_ROOT_FOLDER)
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// HTTP port to listen on
    #[arg(short, long, env = "MIH_INGEST_PORT")]
    port: Option<u16>,

    /// Path to the TOML bootstrap file
    #[arg(long, env = "MIH_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let defaults = CompiledDefaults::for_current_platform();

    // Config is read before tracing so its log level can seed the filter
    let config_path = args.config.clone().or_else(default_config_path);
    let toml_config = match &config_path {
        Some(path) => load_toml_config(path)?,
        None => Default::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level));
    fmt().with_env_filter(filter).with_target(true).init();

    info!(
        "Starting mih-ingest (CSV Ingestion) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    // Step 1: Resolve root folder
    let root_folder = RootFolderResolver::new("mih-ingest")
        .with_cli_arg(args.root_folder)
        .with_toml(&toml_config)
        .resolve();

    // Step 2: Create root folder directory if missing
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .map_err(|e| anyhow::anyhow!("Failed to initialize root folder: {}", e))?;

    // Step 3: Open or create database
    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let db_pool = mih_ingest::db::init_database(&db_path).await?;

    // Step 4: Upload artifact directory
    let uploads_dir = initializer.uploads_dir(&toml_config);
    let uploads = UploadStore::new(&uploads_dir)?;
    info!("Uploads: {}", uploads_dir.display());

    let pipeline = IngestionPipeline::new(db_pool.clone(), uploads);
    let state = AppState::new(db_pool, pipeline);
    let app = mih_ingest::build_router(state);

    let port = args
        .port
        .or(toml_config.ingest.port)
        .unwrap_or(defaults.ingest_port);
    let bind_addr = format!("127.0.0.1:{}", port);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
