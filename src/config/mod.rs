//! Server configuration: schema, loading, validation and live reload.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GateServerConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs sees a write event
//!     → loader.rs re-reads and validates the file
//!     → unchanged configs are dropped
//!     → server rebuilds the AccessGate and swaps it atomically
//! ```
//!
//! # Design Decisions
//! - A loaded config is never mutated; reload produces a new value
//! - Every field has a default, so an empty file is a valid config
//! - serde handles shape, validation.rs handles ranges and addresses
//! - Only gate thresholds are hot-reloadable; listener and session
//!   settings take effect on restart

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, GateConfig, GateServerConfig, ListenerConfig, ObservabilityConfig,
    SessionConfig, TimeoutConfig,
};
pub use watcher::ConfigWatcher;
