//! `AutoDeal` Daemon
//!
//! Serves the marketplace gRPC API (listings, offer ledger, contact
//! disclosure, phone-OTP auth) over TCP, backed by `SQLite`.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use autodeal_core::config::load_config;
use autodeal_core::tracing_init::init_tracing;
use autodeal_daemon::server::{GrpcServer, ServerConfig};
use autodeal_daemon::storage::Database;

#[derive(Parser, Debug)]
#[command(name = "autodeal-daemon")]
#[command(version, about = "AutoDeal daemon - marketplace negotiation backend")]
struct Args {
    /// TCP bind address (falls back to the configured port on loopback)
    #[arg(long, env = "AUTODEAL_ADDR")]
    addr: Option<SocketAddr>,

    /// Database file path
    #[arg(long, env = "AUTODEAL_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Emit JSON log lines
    #[arg(long, env = "AUTODEAL_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(None)?;

    init_tracing(
        &format!("autodeal_daemon={}", config.daemon.log_level),
        args.log_json || config.daemon.log_json,
    );

    // Optional OTLP telemetry pipeline.
    #[cfg(feature = "metrics")]
    let metrics_guard = match std::env::var("AUTODEAL_OTLP_ENDPOINT") {
        Ok(endpoint) if !endpoint.is_empty() => {
            info!(%endpoint, "OTLP telemetry enabled");
            Some(autodeal_core::metrics::init_metrics(&endpoint)?)
        }
        _ => None,
    };

    let db_path = match args.db_path.or_else(|| config.daemon.database_path.clone()) {
        Some(path) => path,
        None => default_db_path()?,
    };
    let db = Database::open(&db_path).await?;

    let addr = args
        .addr
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], config.daemon.port)));

    let server = GrpcServer::new(ServerConfig::tcp(addr), db, config.sms);

    #[cfg(unix)]
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    // Notify systemd that the daemon is ready to serve (unix only).
    #[cfg(unix)]
    sd_notify::notify(true, &[sd_notify::NotifyState::Ready])?;

    #[cfg(unix)]
    let sigterm_future = sigterm.recv();
    #[cfg(not(unix))]
    let sigterm_future = std::future::pending::<Option<()>>();

    info!(%addr, "gRPC server ready");

    tokio::select! {
        result = server.serve_tcp() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C shutdown signal");
        }
        _ = sigterm_future => {
            info!("Received SIGTERM shutdown signal");
        }
    }

    #[cfg(feature = "metrics")]
    if let Some(guard) = metrics_guard {
        guard.shutdown()?;
    }

    info!("Daemon stopped");
    Ok(())
}

/// Default database path: ~/.autodeal/daemon.db
fn default_db_path() -> anyhow::Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".autodeal").join("daemon.db"))
}
