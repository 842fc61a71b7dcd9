use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use taskpad::{config::AppConfig, storage::SqliteStore, web, AppContext};

#[derive(Parser)]
#[command(
    name = "taskpad",
    about = "taskpad — a small server-rendered task tracker",
    version
)]
struct Args {
    /// HTTP port
    #[arg(long, env = "TASKPAD_PORT")]
    port: Option<u16>,

    /// Data directory for the SQLite database and config.toml
    #[arg(long, env = "TASKPAD_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TASKPAD_LOG")]
    log: Option<String>,

    /// Bind address (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "TASKPAD_BIND")]
    bind_address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Arc::new(AppConfig::new(
        args.port,
        args.data_dir,
        args.log,
        args.bind_address,
    ));

    tracing_subscriber::fmt()
        .with_env_filter(config.log.as_str())
        .compact()
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "taskpad starting");
    info!(
        data_dir = %config.data_dir.display(),
        port = config.port,
        "config loaded"
    );

    let store = Arc::new(
        SqliteStore::new_with_slow_query(
            &config.data_dir,
            config.observability.slow_query_threshold_ms,
        )
        .await?,
    );

    let ctx = Arc::new(AppContext {
        config,
        store,
        templates: web::templates::build()?,
        started_at: std::time::Instant::now(),
    });

    tokio::select! {
        result = web::serve(ctx) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            Ok(())
        }
    }
}
