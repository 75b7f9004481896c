//! HTTP hosting of the course pages.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace span, timeout)
//!     → middleware/access_gate.rs (session cookie, UA screen, access gate)
//!         → denied: response.rs (block page, rendering stops here)
//!         → admitted: pages.rs (page render, navigation event)
//!     → Send to client
//! ```

pub mod middleware;
pub mod pages;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, GatePolicy, HttpServer};
