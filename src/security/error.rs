//! Gate error definitions.
//!
//! None of these reach the end user: every variant resolves to admitting the
//! request, with the anomaly logged for operators.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    /// The session store is full and nothing idle could be evicted.
    #[error("session store at capacity ({0} sessions)")]
    SessionCapacity(usize),

    /// A previous request panicked while holding the session lock.
    #[error("session state poisoned: {0}")]
    SessionPoisoned(String),
}
