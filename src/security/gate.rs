//! The access gate: one allow/deny decision per page load.
//!
//! # Sequencing
//! ```text
//! resolve identity
//!     → rate limiter      (deny: rate_limit_exceeded)
//!     → behavior monitor  (deny: suspicious_behavior)
//!     → normal_access
//! ```
//! The first failing check wins; later checks are not evaluated.
//!
//! Missing identity and panics inside a check both admit the request.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::config::GateConfig;
use crate::observability::metrics;
use crate::security::access_log::AccessAction;
use crate::security::behavior::{BehaviorCheck, BehaviorMonitor};
use crate::security::clock::{Clock, SystemClock};
use crate::security::identity::{ClientIdentity, IdentityResolver, SessionIdentityResolver};
use crate::security::rate_limit::{RateLimiter, RateLimits};
use crate::session::SessionState;

pub const RATE_LIMITED_MESSAGE: &str = "access frequency too high, try later";
pub const SUSPICIOUS_MESSAGE: &str = "abnormal access pattern detected";
pub const AUTOMATED_CLIENT_MESSAGE: &str = "automated client detected";

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DenyReason {
    RateLimited { until: f64 },
    SuspiciousBehavior,
    AutomatedClient,
}

impl DenyReason {
    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::RateLimited { .. } => RATE_LIMITED_MESSAGE,
            DenyReason::SuspiciousBehavior => SUSPICIOUS_MESSAGE,
            DenyReason::AutomatedClient => AUTOMATED_CLIENT_MESSAGE,
        }
    }

    pub fn action(&self) -> AccessAction {
        match self {
            DenyReason::RateLimited { .. } => AccessAction::RateLimitExceeded,
            DenyReason::SuspiciousBehavior => AccessAction::SuspiciousBehavior,
            DenyReason::AutomatedClient => AccessAction::CrawlerUserAgent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AccessDecision {
    Allowed,
    Denied(DenyReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }

    /// `(allowed, reason)`.
    pub fn into_parts(self) -> (bool, Option<&'static str>) {
        match self {
            AccessDecision::Allowed => (true, None),
            AccessDecision::Denied(reason) => (false, Some(reason.message())),
        }
    }

    fn outcome(&self) -> &'static str {
        match self {
            AccessDecision::Allowed => "allowed",
            AccessDecision::Denied(reason) => reason.action().as_str(),
        }
    }
}

/// Composes identity resolution, rate limiting and behavior monitoring.
///
/// The gate holds policy only; all mutable state lives in the
/// [`SessionState`] passed to [`AccessGate::check_access`].
pub struct AccessGate {
    limiter: RateLimiter,
    behavior: Box<dyn BehaviorCheck>,
    resolver: Box<dyn IdentityResolver>,
    clock: Arc<dyn Clock>,
}

impl AccessGate {
    pub fn new(config: &GateConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            limiter: RateLimiter::new(RateLimits::from(config)),
            behavior: Box::new(BehaviorMonitor::from(config)),
            resolver: Box::new(SessionIdentityResolver),
            clock,
        }
    }

    pub fn with_behavior_check(mut self, behavior: Box<dyn BehaviorCheck>) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_identity_resolver(mut self, resolver: Box<dyn IdentityResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn limits(&self) -> &RateLimits {
        self.limiter.limits()
    }

    /// Resolve the session's identity. `None` means identity is unavailable.
    pub fn resolve_identity(&self, session: &mut SessionState) -> Option<ClientIdentity> {
        self.resolver.resolve(session)
    }

    /// Rate-limit check for `identity`. Admits when there is no identity.
    pub fn check_rate_limit(
        &self,
        identity: Option<&ClientIdentity>,
        session: &mut SessionState,
        now: f64,
    ) -> bool {
        self.rate_limit(identity, session, now).is_none()
    }

    /// Behavior check over the session's navigation history.
    pub fn check_suspicious_behavior(&self, session: &mut SessionState, now: f64) -> bool {
        self.behavior.check(session.page_switches_mut(), now)
    }

    /// Run every check and record the outcome in the session's access log.
    pub fn check_access(&self, session: &mut SessionState) -> AccessDecision {
        let now = self.clock.now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.evaluate(session, now)));

        let decision = match result {
            Ok(decision) => decision,
            Err(_) => {
                tracing::error!("Access check panicked; admitting request");
                metrics::record_check_panic();
                AccessDecision::Allowed
            }
        };
        metrics::record_gate_decision(decision.outcome());
        decision
    }

    fn evaluate(&self, session: &mut SessionState, now: f64) -> AccessDecision {
        let identity = self.resolve_identity(session);

        if let Some(until) = self.rate_limit(identity.as_ref(), session, now) {
            tracing::warn!(
                identity = identity.as_ref().map(ClientIdentity::as_str).unwrap_or("-"),
                blocked_until = until,
                "Rate limit exceeded"
            );
            session.log_access(now, identity, AccessAction::RateLimitExceeded);
            return AccessDecision::Denied(DenyReason::RateLimited { until });
        }

        if !self.check_suspicious_behavior(session, now) {
            tracing::warn!(
                identity = identity.as_ref().map(ClientIdentity::as_str).unwrap_or("-"),
                page_switches = session.page_switches().len(),
                "Suspicious navigation pattern"
            );
            session.log_access(now, identity, AccessAction::SuspiciousBehavior);
            return AccessDecision::Denied(DenyReason::SuspiciousBehavior);
        }

        session.log_access(now, identity, AccessAction::NormalAccess);
        AccessDecision::Allowed
    }

    /// Returns the block expiry when the request is denied.
    fn rate_limit(
        &self,
        identity: Option<&ClientIdentity>,
        session: &mut SessionState,
        now: f64,
    ) -> Option<f64> {
        let identity = identity?;
        let record = session.access_record_mut(identity);
        let decision = self.limiter.check(record, now);
        decision.blocked_until()
    }
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::new(&GateConfig::default(), Arc::new(SystemClock))
    }
}
