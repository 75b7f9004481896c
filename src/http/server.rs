//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with page handlers
//! - Wire up middleware (request ID, tracing, timeout, access gate)
//! - Serve the admin API on its own listener when enabled
//! - Apply hot-reloaded gate thresholds without dropping sessions

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin;
use crate::config::{GateConfig, GateServerConfig};
use crate::http::middleware::access_gate_middleware;
use crate::http::pages;
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::shutdown::wait_for;
use crate::security::{AccessGate, Clock, SystemClock};
use crate::session::SessionStore;

/// The gate together with the config it was built from. Swapped as a unit
/// on reload.
pub struct GatePolicy {
    pub gate: AccessGate,
    pub config: GateConfig,
}

impl GatePolicy {
    pub fn new(config: GateConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            gate: AccessGate::new(&config, clock),
            config,
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub policy: Arc<ArcSwap<GatePolicy>>,
    pub sessions: SessionStore,
    pub clock: Arc<dyn Clock>,
    /// Configuration the server started with.
    pub config: Arc<GateServerConfig>,
}

impl AppState {
    pub fn new(config: GateServerConfig, clock: Arc<dyn Clock>) -> Self {
        let policy = GatePolicy::new(config.gate.clone(), clock.clone());
        Self {
            policy: Arc::new(ArcSwap::from_pointee(policy)),
            sessions: SessionStore::new(config.session.clone(), config.gate.access_log_capacity),
            clock,
            config: Arc::new(config),
        }
    }

    /// Replace the gate with one built from `config`. Session state is kept.
    pub fn apply_gate_config(&self, config: GateConfig) {
        tracing::info!(
            max_requests_per_minute = config.max_requests_per_minute,
            max_requests_per_hour = config.max_requests_per_hour,
            block_duration_minutes = config.block_duration_minutes,
            enabled = config.enabled,
            "Gate configuration applied"
        );
        self.policy
            .store(Arc::new(GatePolicy::new(config, self.clock.clone())));
    }
}

/// HTTP server for the course pages.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GateServerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: GateServerConfig, clock: Arc<dyn Clock>) -> Self {
        let state = AppState::new(config, clock);
        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(state: AppState) -> Router {
        let request_timeout = Duration::from_secs(state.config.timeouts.request_secs);

        let page_routes = Router::new()
            .route("/", get(pages::index))
            .route("/sections/{section}", get(pages::section))
            .route("/sections/{section}/{tab}", get(pages::tab))
            .fallback(pages::fallback)
            .layer(middleware::from_fn_with_state(state.clone(), access_gate_middleware))
            .with_state(state);

        Router::new()
            .route("/healthz", get(|| async { "ok" }))
            .merge(page_routes)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(set_request_id_layer())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until `shutdown` fires. Config updates arriving on
    /// `config_updates` replace the gate thresholds in place.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GateServerConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if self.state.config.admin.enabled {
            let admin_listener = TcpListener::bind(&self.state.config.admin.bind_address).await?;
            tracing::info!(address = %admin_listener.local_addr()?, "Admin API listening");
            let admin_app = admin::setup_admin_router(self.state.clone());
            let admin_shutdown = shutdown.resubscribe();
            tokio::spawn(async move {
                if let Err(e) = axum::serve(admin_listener, admin_app)
                    .with_graceful_shutdown(wait_for(admin_shutdown))
                    .await
                {
                    tracing::error!(error = %e, "Admin API stopped with error");
                }
            });
        }

        let reload_state = self.state.clone();
        let mut reload_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = config_updates.recv() => match update {
                        Some(config) => reload_state.apply_gate_config(config.gate),
                        None => break,
                    },
                    _ = reload_shutdown.recv() => break,
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
