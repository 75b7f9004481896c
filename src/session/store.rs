//! Concurrent in-memory session store.

use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::observability::metrics;
use crate::security::error::GateError;
use crate::security::rate_limit::HOUR_WINDOW_SECS;
use crate::session::state::SessionState;

/// Shared handle to one session's state.
///
/// The mutex makes each gate check (read, prune, count, append) atomic per
/// session, and therefore per identity.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    token: String,
    state: Arc<Mutex<SessionState>>,
}

impl SessionHandle {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, SessionState>, GateError> {
        self.state
            .lock()
            .map_err(|_| GateError::SessionPoisoned(self.token.clone()))
    }
}

/// Diagnostic view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub token: String,
    pub identity: Option<String>,
    pub blocked_until: Option<f64>,
    pub requests_last_hour: usize,
    pub page_switches: usize,
    pub last_seen: f64,
}

/// Sessions keyed by the session cookie value.
///
/// Growth is bounded by `max_sessions`; idle sessions are evicted lazily
/// when a new one would exceed the bound.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<DashMap<String, Arc<Mutex<SessionState>>>>,
    config: SessionConfig,
    access_log_capacity: usize,
}

impl SessionStore {
    pub fn new(config: SessionConfig, access_log_capacity: usize) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            config,
            access_log_capacity,
        }
    }

    /// Issue a fresh session token.
    pub fn new_token() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn get(&self, token: &str) -> Option<SessionHandle> {
        self.inner.get(token).map(|entry| SessionHandle {
            token: token.to_string(),
            state: entry.value().clone(),
        })
    }

    /// Return the session for `token`, creating it if absent.
    ///
    /// The boolean is `true` when the session was created by this call.
    pub fn get_or_create(&self, token: &str, now: f64) -> Result<(SessionHandle, bool), GateError> {
        if let Some(handle) = self.get(token) {
            return Ok((handle, false));
        }

        if self.inner.len() >= self.config.max_sessions {
            let evicted = self.make_room(now);
            tracing::debug!(evicted, "Evicted sessions at capacity");
            if evicted == 0 {
                return Err(GateError::SessionCapacity(self.config.max_sessions));
            }
        }

        let mut created = false;
        let state = self
            .inner
            .entry(token.to_string())
            .or_insert_with(|| {
                created = true;
                Arc::new(Mutex::new(SessionState::new(self.access_log_capacity, now)))
            })
            .value()
            .clone();
        metrics::record_active_sessions(self.inner.len());

        Ok((
            SessionHandle {
                token: token.to_string(),
                state,
            },
            created,
        ))
    }

    /// Free space at capacity in one pass: drop every session idle past the
    /// TTL or, when none is idle, the least recently seen one. Sessions whose
    /// lock is held or poisoned are never evicted. Returns how many were
    /// removed.
    fn make_room(&self, now: f64) -> usize {
        let ttl = self.config.idle_ttl_secs as f64;
        let mut idle = Vec::new();
        let mut oldest: Option<(f64, String)> = None;

        for entry in self.inner.iter() {
            let Ok(state) = entry.value().try_lock() else {
                continue;
            };
            let last_seen = state.last_seen();
            if now - last_seen > ttl {
                idle.push(entry.key().clone());
            } else if oldest.as_ref().map_or(true, |(seen, _)| last_seen < *seen) {
                oldest = Some((last_seen, entry.key().clone()));
            }
        }

        let victims = if idle.is_empty() {
            oldest.map(|(_, token)| vec![token]).unwrap_or_default()
        } else {
            idle
        };
        let removed = victims
            .iter()
            .filter(|token| self.inner.remove(token.as_str()).is_some())
            .count();
        if removed > 0 {
            metrics::record_active_sessions(self.inner.len());
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Summaries of every session, newest first. Waits on each session's
    /// lock in turn; poisoned sessions are skipped.
    pub fn summaries(&self, now: f64) -> Vec<SessionSummary> {
        let mut out: Vec<SessionSummary> = self
            .inner
            .iter()
            .filter_map(|entry| {
                let state = entry.value().lock().ok()?;
                let record = state.own_record();
                Some(SessionSummary {
                    token: entry.key().clone(),
                    identity: state.identity().map(|id| id.to_string()),
                    blocked_until: record
                        .and_then(|r| r.blocked_until())
                        .filter(|&until| now < until),
                    requests_last_hour: record
                        .map(|r| r.count_since(now, HOUR_WINDOW_SECS))
                        .unwrap_or(0),
                    page_switches: state.page_switches().len(),
                    last_seen: state.last_seen(),
                })
            })
            .collect();
        out.sort_by(|a, b| b.last_seen.total_cmp(&a.last_seen));
        out
    }
}
