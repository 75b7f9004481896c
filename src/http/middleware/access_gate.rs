//! Access gate middleware.
//! Runs the gate once per page load, before any page content is produced.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

use crate::http::request::request_id;
use crate::http::response::blocked_response;
use crate::http::server::{AppState, GatePolicy};
use crate::observability::metrics;
use crate::security::{user_agent, AccessAction, AccessDecision, DenyReason, GateError};
use crate::session::{SessionHandle, SessionStore};

pub async fn access_gate_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let policy = state.policy.load_full();

    // 1. Gate disabled: passthrough.
    if !policy.config.enabled {
        return next.run(req).await;
    }

    // 2. Resolve the session token, issuing one when absent or malformed.
    let cookie_name = state.config.session.cookie_name.clone();
    let existing = jar.get(&cookie_name).map(|c| c.value().to_string());
    let (token, jar) = match existing {
        Some(token) if Uuid::parse_str(&token).is_ok() => (token, jar),
        _ => {
            let token = SessionStore::new_token();
            let cookie = Cookie::build((cookie_name, token.clone()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax);
            (token, jar.add(cookie))
        }
    };

    let now = policy.gate.now();
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    // 3. Decide. Any session-layer failure admits the request.
    let handle = match state.sessions.get_or_create(&token, now) {
        Ok((handle, _)) => handle,
        Err(e) => {
            tracing::warn!(request_id = %request_id(&req), error = %e, "No session state; admitting unchecked");
            metrics::record_fail_open("session_capacity");
            return (jar, next.run(req).await).into_response();
        }
    };

    let decision = match decide(&policy, &handle, &user_agent, now) {
        Ok(decision) => decision,
        Err(e) => {
            tracing::error!(request_id = %request_id(&req), error = %e, "Session state unavailable; admitting unchecked");
            metrics::record_fail_open("session_poisoned");
            return (jar, next.run(req).await).into_response();
        }
    };

    // 4. Render or halt.
    match decision {
        AccessDecision::Allowed => {
            req.extensions_mut().insert(handle);
            (jar, next.run(req).await).into_response()
        }
        AccessDecision::Denied(reason) => {
            tracing::warn!(
                request_id = %request_id(&req),
                session = %handle.token(),
                reason = reason.message(),
                "Access denied"
            );
            (jar, blocked_response(reason, now)).into_response()
        }
    }
}

/// Run the optional User-Agent screen, then the gate, under the session
/// lock. Synchronous so the guard can never be held across an await.
fn decide(
    policy: &GatePolicy,
    handle: &SessionHandle,
    user_agent: &str,
    now: f64,
) -> Result<AccessDecision, GateError> {
    let mut session = handle.lock()?;
    session.touch(now);

    if policy.config.screen_user_agents && user_agent::is_automated(user_agent) {
        let identity = policy.gate.resolve_identity(&mut session);
        session.log_access(now, identity, AccessAction::CrawlerUserAgent);
        metrics::record_gate_decision(AccessAction::CrawlerUserAgent.as_str());
        return Ok(AccessDecision::Denied(DenyReason::AutomatedClient));
    }

    Ok(policy.gate.check_access(&mut session))
}
