//! Session-scoped access gate for the plotting course web app.
//!
//! The gate runs once per page load and decides, from per-session state,
//! whether the page may render: a sliding-window rate limiter with a
//! cool-down block, then a navigation-frequency monitor. Denials stop the
//! render and show a block page; every failure inside the gate itself
//! admits the request.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod session;

pub use config::GateServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use security::{AccessDecision, AccessGate};
pub use session::{SessionState, SessionStore};
