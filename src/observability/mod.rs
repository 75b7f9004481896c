//! Logging and metrics.
//!
//! # Data Flow
//! ```text
//! Gate and HTTP layers produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Denials are logged at warn; they are expected, not application errors
//! - Fail-open paths are logged at error and counted
//! - Request ID flows through every log line of a request via TraceLayer

pub mod logging;
pub mod metrics;
