//! session-gate server.
//!
//! ```text
//!     Browser ──▶ listener ──▶ request id / trace / timeout
//!                                   │
//!                                   ▼
//!                        ┌──────────────────────┐      ┌───────────────┐
//!                        │  access gate         │─────▶│ block page    │ (denied)
//!                        │  session → identity  │      └───────────────┘
//!                        │  → rate limit        │
//!                        │  → page-switch check │      ┌───────────────┐
//!                        └──────────────────────┘─────▶│ course page   │ (admitted)
//!                                                      └───────────────┘
//!
//!     Operator ──▶ admin listener ──▶ status / sessions / access logs
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use session_gate::config::{load_config, ConfigWatcher, GateServerConfig};
use session_gate::http::HttpServer;
use session_gate::lifecycle::{signals, Shutdown};
use session_gate::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "session-gate", version, about = "Course page server with a per-session access gate")]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "SESSION_GATE_CONFIG")]
    config: Option<PathBuf>,

    /// Watch the configuration file and apply gate changes live.
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GateServerConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("session-gate v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_requests_per_minute = config.gate.max_requests_per_minute,
        max_requests_per_hour = config.gate.max_requests_per_hour,
        block_duration_minutes = config.gate.block_duration_minutes,
        gate_enabled = config.gate.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Keep the watcher alive for the lifetime of the server.
    let (_watcher, config_updates) = match (&args.config, args.watch) {
        (Some(path), true) => {
            let (watcher, rx) = ConfigWatcher::new(path, Some(config.clone()));
            (Some(watcher.run()?), rx)
        }
        _ => {
            let (_, rx) = mpsc::unbounded_channel();
            (None, rx)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config);
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
