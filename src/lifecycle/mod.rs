//! Process lifecycle: signals and coordinated shutdown.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Logging/metrics → Bind listeners → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → servers stop accepting and drain
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Config reload is driven by the file watcher, not SIGHUP
//! - Session state is in-memory only; shutdown discards it

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
