//! # metas-daemon
//!
//! Serves the Metas JSON API and browsing UI.
//!
//! ## Usage
//!
//! ```text
//! metas-daemon --project-root /srv/metas --bind 0.0.0.0:8080
//! ```
//!
//! State lives under `<project-root>/.metas/` unless overridden by
//! `.metas/daemon.toml`, `--config`, or the flags below.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use metas_daemon::config::DaemonConfig;
use metas_daemon::{app, build_service, AppState};

/// Metas goal registration server.
#[derive(Parser)]
#[command(name = "metas-daemon", version, about = "Metas goal registration server")]
struct Cli {
    /// Project root directory (defaults to current directory).
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Config file (defaults to <project-root>/.metas/daemon.toml if present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, overriding the config file.
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// SQLite database path, overriding the config file.
    #[arg(long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("metas_core=info".parse()?)
                .add_directive("metas_daemon=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let project_root = cli
        .project_root
        .canonicalize()
        .with_context(|| format!("project root {} not found", cli.project_root.display()))?;

    let mut config = DaemonConfig::load(&project_root, cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(database) = cli.database {
        config.database = database;
    }

    tracing::info!("Starting Metas server");
    tracing::info!("Project root: {}", project_root.display());
    tracing::info!("Database: {}", config.database.display());

    let service = build_service(&config)
        .with_context(|| format!("cannot open database {}", config.database.display()))?;
    let router = app(AppState::new(service), &config);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("cannot bind {}", config.bind))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| tracing::error!("server error: {:?}", e))?;

    tracing::info!("Metas server shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
