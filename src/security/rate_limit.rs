//! Sliding-window rate limiting with a cool-down block.
//!
//! Each identity keeps the timestamps of its admitted requests for the last
//! hour. Pruning happens on every check; there is no background sweep.
//! Tripping either the per-minute or the per-hour cap blocks the identity
//! for a fixed duration, and the block clears lazily on the first check
//! after it expires.

use std::collections::VecDeque;

use serde::Serialize;

use crate::config::GateConfig;

/// Window for the per-minute cap, in seconds.
pub const MINUTE_WINDOW_SECS: f64 = 60.0;
/// Window for the per-hour cap, and the retention horizon for timestamps.
pub const HOUR_WINDOW_SECS: f64 = 3600.0;

/// Request history and block state for one identity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AccessRecord {
    /// Admitted request times, in insertion (chronological) order.
    requests: VecDeque<f64>,
    /// When set and in the future, every request is denied.
    blocked_until: Option<f64>,
}

/// Coarse state of an [`AccessRecord`] at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordState {
    Clear,
    Blocked { until: f64 },
}

impl AccessRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocked_until(&self) -> Option<f64> {
        self.blocked_until
    }

    pub fn request_count(&self) -> usize {
        self.requests.len()
    }

    pub fn requests(&self) -> impl Iterator<Item = f64> + '_ {
        self.requests.iter().copied()
    }

    /// State as observed at `now`, without mutating the record.
    pub fn state(&self, now: f64) -> RecordState {
        match self.blocked_until {
            Some(until) if now < until => RecordState::Blocked { until },
            _ => RecordState::Clear,
        }
    }

    /// Number of retained requests strictly newer than `now - window`.
    pub fn count_since(&self, now: f64, window: f64) -> usize {
        let cutoff = now - window;
        self.requests.iter().filter(|&&t| t > cutoff).count()
    }

    fn prune(&mut self, now: f64) {
        let cutoff = now - HOUR_WINDOW_SECS;
        self.requests.retain(|&t| t > cutoff);
    }
}

/// Thresholds applied by the [`RateLimiter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimits {
    pub max_per_minute: usize,
    pub max_per_hour: usize,
    /// Cool-down duration in seconds.
    pub block_secs: f64,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            max_per_minute: 30,
            max_per_hour: 500,
            block_secs: 60.0 * 60.0,
        }
    }
}

impl From<&GateConfig> for RateLimits {
    fn from(config: &GateConfig) -> Self {
        Self {
            max_per_minute: config.max_requests_per_minute,
            max_per_hour: config.max_requests_per_hour,
            block_secs: config.block_duration_minutes as f64 * 60.0,
        }
    }
}

/// Outcome of a single rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateDecision {
    Admitted,
    /// An earlier violation is still being served.
    StillBlocked { until: f64 },
    /// This request tripped the per-minute cap.
    MinuteLimit { until: f64 },
    /// This request tripped the per-hour cap.
    HourLimit { until: f64 },
}

impl RateDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, RateDecision::Admitted)
    }

    pub fn blocked_until(&self) -> Option<f64> {
        match *self {
            RateDecision::Admitted => None,
            RateDecision::StillBlocked { until }
            | RateDecision::MinuteLimit { until }
            | RateDecision::HourLimit { until } => Some(until),
        }
    }
}

/// Stateless policy; all state lives in the [`AccessRecord`] handed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateLimiter {
    limits: RateLimits,
}

impl RateLimiter {
    pub fn new(limits: RateLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &RateLimits {
        &self.limits
    }

    /// Check and, when admitted, record a request at `now`.
    ///
    /// Callers must hold exclusive access to `record` for the whole call so
    /// that two concurrent requests cannot both pass the threshold.
    pub fn check(&self, record: &mut AccessRecord, now: f64) -> RateDecision {
        if let Some(until) = record.blocked_until {
            if now < until {
                return RateDecision::StillBlocked { until };
            }
            record.blocked_until = None;
        }

        record.prune(now);

        let recent = record.count_since(now, MINUTE_WINDOW_SECS);
        if recent >= self.limits.max_per_minute {
            let until = now + self.limits.block_secs;
            record.blocked_until = Some(until);
            return RateDecision::MinuteLimit { until };
        }

        if record.requests.len() >= self.limits.max_per_hour {
            let until = now + self.limits.block_secs;
            record.blocked_until = Some(until);
            return RateDecision::HourLimit { until };
        }

        record.requests.push_back(now);
        RateDecision::Admitted
    }
}
