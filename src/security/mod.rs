//! Access-control subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming page request:
//!     → user_agent.rs (optional crawler screen)
//!     → gate.rs
//!         → identity.rs (session-scoped pseudo identity)
//!         → rate_limit.rs (per-minute / per-hour sliding windows)
//!         → behavior.rs (page-switch frequency)
//!         → access_log.rs (diagnostic record of the outcome)
//!     → Page handler, or block page on denial
//! ```
//!
//! # Design Decisions
//! - Fail open: missing identity, exhausted session store and panics inside
//!   a check all admit the request
//! - Lazy pruning on every check, no background sweeps
//! - Policy objects are stateless; state lives in `SessionState`

pub mod access_log;
pub mod behavior;
pub mod clock;
pub mod error;
pub mod gate;
pub mod identity;
pub mod rate_limit;
pub mod user_agent;

pub use access_log::{AccessAction, AccessLog, AccessLogEntry};
pub use behavior::{BehaviorCheck, BehaviorMonitor, PageSwitchLog};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::GateError;
pub use gate::{AccessDecision, AccessGate, DenyReason};
pub use identity::{ClientIdentity, IdentityResolver, SessionIdentityResolver};
pub use rate_limit::{AccessRecord, RateDecision, RateLimiter, RateLimits, RecordState};
