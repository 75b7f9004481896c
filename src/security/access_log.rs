//! Bounded per-session diagnostic log of gate decisions.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::security::identity::ClientIdentity;

pub const DEFAULT_ACCESS_LOG_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessAction {
    NormalAccess,
    RateLimitExceeded,
    SuspiciousBehavior,
    CrawlerUserAgent,
}

impl AccessAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessAction::NormalAccess => "normal_access",
            AccessAction::RateLimitExceeded => "rate_limit_exceeded",
            AccessAction::SuspiciousBehavior => "suspicious_behavior",
            AccessAction::CrawlerUserAgent => "crawler_user_agent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessLogEntry {
    /// Seconds since epoch.
    pub timestamp: f64,
    pub client_identity: Option<ClientIdentity>,
    pub action: AccessAction,
}

/// FIFO log that evicts the oldest entry once `capacity` is reached.
#[derive(Debug, Clone)]
pub struct AccessLog {
    entries: VecDeque<AccessLogEntry>,
    capacity: usize,
}

impl AccessLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, timestamp: f64, client_identity: Option<ClientIdentity>, action: AccessAction) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(AccessLogEntry {
            timestamp,
            client_identity,
            action,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccessLogEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&AccessLogEntry> {
        self.entries.back()
    }

    /// Snapshot in chronological order.
    pub fn to_vec(&self) -> Vec<AccessLogEntry> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for AccessLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ACCESS_LOG_CAPACITY)
    }
}
