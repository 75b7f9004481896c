//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use session_gate::config::GateServerConfig;
use session_gate::http::HttpServer;
use session_gate::lifecycle::Shutdown;
use tokio::sync::mpsc;

/// Start a gate server on `addr` and return its shutdown handle.
pub async fn start_server(addr: SocketAddr, mut config: GateServerConfig) -> Shutdown {
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let (_, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    // Admin listener binds inside `run`.
    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown
}

/// A client that keeps the session cookie between requests, like a browser.
#[allow(dead_code)]
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36")
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
