//! Navigation-frequency monitor.

use std::collections::VecDeque;

use serde::Serialize;

use crate::config::GateConfig;

/// Session-scoped navigation event timestamps, oldest first.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct PageSwitchLog {
    events: VecDeque<f64>,
}

impl PageSwitchLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, at: f64) {
        self.events.push_back(at);
    }

    /// Drop events at or before `now - window`.
    pub fn prune(&mut self, now: f64, window: f64) {
        let cutoff = now - window;
        self.events.retain(|&t| t > cutoff);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// A check over the session's navigation history. Returns `true` when the
/// pattern looks normal.
pub trait BehaviorCheck: Send + Sync {
    fn check(&self, switches: &mut PageSwitchLog, now: f64) -> bool;
}

/// Flags a session that switched pages more than `max_switches` times inside
/// `window_secs`. Never appends; navigation events are recorded by the host.
#[derive(Debug, Clone, Copy)]
pub struct BehaviorMonitor {
    window_secs: f64,
    max_switches: usize,
}

impl BehaviorMonitor {
    pub fn new(window_secs: f64, max_switches: usize) -> Self {
        Self {
            window_secs,
            max_switches,
        }
    }
}

impl Default for BehaviorMonitor {
    fn default() -> Self {
        Self::new(300.0, 20)
    }
}

impl From<&GateConfig> for BehaviorMonitor {
    fn from(config: &GateConfig) -> Self {
        Self::new(config.page_switch_window_secs as f64, config.max_page_switches)
    }
}

impl BehaviorCheck for BehaviorMonitor {
    fn check(&self, switches: &mut PageSwitchLog, now: f64) -> bool {
        switches.prune(now, self.window_secs);
        switches.len() <= self.max_switches
    }
}
