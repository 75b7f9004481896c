//! Gate behavior driven by a synthetic clock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use session_gate::config::GateConfig;
use session_gate::security::gate::RATE_LIMITED_MESSAGE;
use session_gate::security::{
    AccessAction, AccessDecision, AccessGate, BehaviorCheck, BehaviorMonitor, ClientIdentity,
    IdentityResolver, ManualClock, PageSwitchLog, SessionIdentityResolver,
};
use session_gate::session::SessionState;

/// Always resolves to the same fixed identity.
struct FixedIdentity(&'static str);

impl IdentityResolver for FixedIdentity {
    fn resolve(&self, session: &mut SessionState) -> Option<ClientIdentity> {
        let identity = ClientIdentity::from(self.0);
        session.set_identity(identity.clone());
        Some(identity)
    }
}

/// Identity resolution is unavailable.
struct NoIdentity;

impl IdentityResolver for NoIdentity {
    fn resolve(&self, _session: &mut SessionState) -> Option<ClientIdentity> {
        None
    }
}

/// Counts invocations, then defers to the real monitor.
struct SpyBehavior {
    calls: Arc<AtomicUsize>,
    inner: BehaviorMonitor,
}

impl BehaviorCheck for SpyBehavior {
    fn check(&self, switches: &mut PageSwitchLog, now: f64) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.check(switches, now)
    }
}

fn setup(start: f64) -> (AccessGate, Arc<ManualClock>, SessionState) {
    let clock = Arc::new(ManualClock::new(start));
    let gate = AccessGate::new(&GateConfig::default(), clock.clone())
        .with_identity_resolver(Box::new(FixedIdentity("abc123")));
    (gate, clock, SessionState::new(100, start))
}

#[test]
fn test_end_to_end_scenario() {
    let (gate, clock, mut session) = setup(0.0);

    for t in 0..29 {
        clock.set(t as f64);
        assert!(gate.check_access(&mut session).is_allowed(), "t={}", t);
    }

    clock.set(29.0);
    assert_eq!(gate.check_access(&mut session).into_parts(), (true, None));

    clock.set(30.0);
    assert_eq!(
        gate.check_access(&mut session).into_parts(),
        (false, Some("access frequency too high, try later"))
    );

    clock.set(3631.0);
    assert_eq!(gate.check_access(&mut session).into_parts(), (true, None));
}

#[test]
fn test_identity_is_idempotent() {
    let gate = AccessGate::default();
    let mut session = SessionState::new(100, 0.0);
    let first = gate.resolve_identity(&mut session);
    let second = gate.resolve_identity(&mut session);
    assert!(first.is_some());
    assert_eq!(first, second);

    let resolver = SessionIdentityResolver;
    assert_eq!(resolver.resolve(&mut session), first);
}

#[test]
fn test_thirty_in_fifty_nine_seconds() {
    let (gate, clock, mut session) = setup(1_000.0);
    let step = 59.0 / 29.0;

    for i in 0..30 {
        clock.set(1_000.0 + i as f64 * step);
        assert!(gate.check_access(&mut session).is_allowed(), "request {}", i + 1);
    }

    clock.set(1_059.5);
    assert!(!gate.check_access(&mut session).is_allowed());
}

#[test]
fn test_hourly_cap() {
    let (gate, clock, mut session) = setup(0.0);
    let step = 59.0 * 60.0 / 500.0;

    for i in 0..500 {
        clock.set(i as f64 * step);
        assert!(gate.check_access(&mut session).is_allowed(), "request {}", i + 1);
    }

    clock.set(500.0 * step);
    assert_eq!(
        gate.check_access(&mut session).into_parts(),
        (false, Some(RATE_LIMITED_MESSAGE))
    );
}

#[test]
fn test_block_persists_then_expires() {
    let (gate, clock, mut session) = setup(0.0);
    for t in 0..31 {
        clock.set(t as f64);
        gate.check_access(&mut session);
    }
    let until = session
        .own_record()
        .and_then(|r| r.blocked_until())
        .expect("identity should be blocked");
    assert_eq!(until, 3630.0);

    // Sparse traffic during the block is still denied.
    for t in [100.0, 1_000.0, 2_000.0, 3_629.0] {
        clock.set(t);
        assert!(!gate.check_access(&mut session).is_allowed(), "t={}", t);
    }

    clock.set(until + 1.0);
    assert!(gate.check_access(&mut session).is_allowed());
    assert_eq!(session.own_record().and_then(|r| r.blocked_until()), None);
}

#[test]
fn test_pruning_windows() {
    let config = GateConfig {
        max_requests_per_minute: 30,
        max_requests_per_hour: 40,
        ..GateConfig::default()
    };
    let clock = Arc::new(ManualClock::new(0.0));
    let gate = AccessGate::new(&config, clock.clone())
        .with_identity_resolver(Box::new(FixedIdentity("abc123")));
    let mut session = SessionState::new(100, 0.0);

    // 29 requests in the first minute: under the per-minute cap.
    for i in 0..29 {
        clock.set(i as f64);
        assert!(gate.check_access(&mut session).is_allowed());
    }
    // 61s later those no longer count per minute, but they do per hour.
    for i in 0..11 {
        clock.set(100.0 + i as f64);
        assert!(gate.check_access(&mut session).is_allowed());
    }
    clock.set(200.0);
    assert!(!gate.check_access(&mut session).is_allowed(), "hourly cap of 40 reached");

    // Once the block and the hour have passed, the old entries are gone.
    clock.set(200.0 + 3600.0);
    assert!(gate.check_access(&mut session).is_allowed());
    assert_eq!(session.own_record().map(|r| r.request_count()), Some(1));
}

#[test]
fn test_access_log_keeps_latest_hundred() {
    let (gate, clock, mut session) = setup(0.0);
    // 150 events, spaced so neither cap trips.
    for i in 0..150 {
        clock.set(i as f64 * 10.0);
        gate.check_access(&mut session);
    }

    let log = session.access_log();
    assert_eq!(log.len(), 100);
    let stamps: Vec<f64> = log.iter().map(|e| e.timestamp).collect();
    let expected: Vec<f64> = (50..150).map(|i| i as f64 * 10.0).collect();
    assert_eq!(stamps, expected);
    assert!(log.iter().all(|e| e.action == AccessAction::NormalAccess));
}

#[test]
fn test_missing_identity_fails_open() {
    let clock = Arc::new(ManualClock::new(0.0));
    let gate = AccessGate::new(&GateConfig::default(), clock.clone())
        .with_identity_resolver(Box::new(NoIdentity));
    let mut session = SessionState::new(100, 0.0);

    for i in 0..1_000 {
        clock.set(i as f64 * 0.01);
        assert_eq!(gate.check_access(&mut session).into_parts(), (true, None));
    }
    assert!(session.access_log().iter().all(|e| e.client_identity.is_none()));
}

#[test]
fn test_rate_limit_denial_skips_behavior_check() {
    let calls = Arc::new(AtomicUsize::new(0));
    let clock = Arc::new(ManualClock::new(0.0));
    let gate = AccessGate::new(&GateConfig::default(), clock.clone())
        .with_identity_resolver(Box::new(FixedIdentity("abc123")))
        .with_behavior_check(Box::new(SpyBehavior {
            calls: calls.clone(),
            inner: BehaviorMonitor::default(),
        }));
    let mut session = SessionState::new(100, 0.0);

    for t in 0..30 {
        clock.set(t as f64);
        assert!(gate.check_access(&mut session).is_allowed());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 30);

    clock.set(30.0);
    let decision = gate.check_access(&mut session);
    assert!(matches!(decision, AccessDecision::Denied(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 30, "behavior check must not run");

    clock.set(31.0);
    gate.check_access(&mut session);
    assert_eq!(calls.load(Ordering::SeqCst), 30);
}

#[test]
fn test_navigation_burst_is_flagged() {
    let (gate, clock, mut session) = setup(0.0);
    for i in 0..21 {
        session.record_navigation(&format!("/sections/page-{}", i), i as f64);
    }
    clock.set(25.0);
    let (allowed, reason) = gate.check_access(&mut session).into_parts();
    assert!(!allowed);
    assert_eq!(reason, Some("abnormal access pattern detected"));

    // Five minutes on, the burst has aged out.
    clock.set(325.0);
    assert!(gate.check_access(&mut session).is_allowed());
}
