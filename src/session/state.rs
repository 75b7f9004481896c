//! Per-session state owned by the host and handed to the gate.

use std::collections::HashMap;

use crate::security::access_log::{AccessAction, AccessLog};
use crate::security::behavior::PageSwitchLog;
use crate::security::identity::ClientIdentity;
use crate::security::rate_limit::AccessRecord;

/// Everything the gate tracks for one browser session.
///
/// Created on the session's first request and dropped with the session;
/// nothing here outlives the process.
#[derive(Debug, Clone)]
pub struct SessionState {
    seed: Option<String>,
    identity: Option<ClientIdentity>,
    access_records: HashMap<ClientIdentity, AccessRecord>,
    page_switches: PageSwitchLog,
    access_log: AccessLog,
    current_page: Option<String>,
    last_seen: f64,
}

impl SessionState {
    pub fn new(access_log_capacity: usize, now: f64) -> Self {
        Self {
            seed: None,
            identity: None,
            access_records: HashMap::new(),
            page_switches: PageSwitchLog::new(),
            access_log: AccessLog::with_capacity(access_log_capacity),
            current_page: None,
            last_seen: now,
        }
    }

    pub fn seed(&self) -> Option<&str> {
        self.seed.as_deref()
    }

    pub fn set_seed(&mut self, seed: String) {
        self.seed = Some(seed);
    }

    pub fn identity(&self) -> Option<&ClientIdentity> {
        self.identity.as_ref()
    }

    pub fn set_identity(&mut self, identity: ClientIdentity) {
        self.identity = Some(identity);
    }

    /// Fetch or lazily create the record for `identity`.
    pub fn access_record_mut(&mut self, identity: &ClientIdentity) -> &mut AccessRecord {
        self.access_records.entry(identity.clone()).or_default()
    }

    pub fn access_record(&self, identity: &ClientIdentity) -> Option<&AccessRecord> {
        self.access_records.get(identity)
    }

    /// Record for this session's own resolved identity, if any.
    pub fn own_record(&self) -> Option<&AccessRecord> {
        self.identity.as_ref().and_then(|id| self.access_records.get(id))
    }

    pub fn page_switches(&self) -> &PageSwitchLog {
        &self.page_switches
    }

    pub fn page_switches_mut(&mut self) -> &mut PageSwitchLog {
        &mut self.page_switches
    }

    /// Note that the session is viewing `page`. Appends a navigation event
    /// only when the page differs from the one viewed last.
    ///
    /// Returns whether a navigation event was recorded.
    pub fn record_navigation(&mut self, page: &str, now: f64) -> bool {
        if self.current_page.as_deref() == Some(page) {
            return false;
        }
        self.current_page = Some(page.to_string());
        self.page_switches.record(now);
        true
    }

    pub fn current_page(&self) -> Option<&str> {
        self.current_page.as_deref()
    }

    pub fn access_log(&self) -> &AccessLog {
        &self.access_log
    }

    pub fn log_access(&mut self, now: f64, identity: Option<ClientIdentity>, action: AccessAction) {
        self.access_log.push(now, identity, action);
    }

    pub fn touch(&mut self, now: f64) {
        self.last_seen = now;
    }

    pub fn last_seen(&self) -> f64 {
        self.last_seen
    }
}
