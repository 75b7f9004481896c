//! Session bookkeeping.
//!
//! One `SessionState` per browser session, keyed by the session cookie and
//! owned by the `SessionStore`. The gate never reaches for ambient state; the
//! HTTP layer locks the session and passes it in.

pub mod state;
pub mod store;

pub use state::SessionState;
pub use store::{SessionHandle, SessionStore, SessionSummary};
