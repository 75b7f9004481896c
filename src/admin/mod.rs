//! Admin diagnostics API: gate status, live sessions and their access logs.

pub mod handlers;
pub mod auth;

use axum::{
    routing::get,
    Router,
    middleware,
};
use crate::http::server::AppState;
use self::handlers::*;
use self::auth::admin_auth_middleware;

pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/sessions", get(get_sessions))
        .route("/admin/sessions/{token}/log", get(get_session_log))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::config::GateServerConfig;
    use crate::security::{AccessAction, ManualClock};

    fn state() -> AppState {
        let mut config = GateServerConfig::default();
        config.admin.enabled = true;
        config.admin.api_key = "test-key".into();
        AppState::new(config, Arc::new(ManualClock::new(50.0)))
    }

    fn authed(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, "Bearer test-key")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_requires_bearer_key() {
        let app = setup_admin_router(state());
        let req = Request::builder().uri("/admin/status").body(Body::empty()).unwrap();
        assert_eq!(app.clone().oneshot(req).await.unwrap().status(), StatusCode::UNAUTHORIZED);

        let req = Request::builder()
            .uri("/admin/status")
            .header(header::AUTHORIZATION, "Bearer wrong")
            .body(Body::empty())
            .unwrap();
        assert_eq!(app.clone().oneshot(req).await.unwrap().status(), StatusCode::UNAUTHORIZED);

        assert_eq!(app.oneshot(authed("/admin/status")).await.unwrap().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_session_log() {
        let state = state();
        let (handle, _) = state.sessions.get_or_create("tok", 50.0).unwrap();
        {
            let mut session = handle.lock().unwrap();
            state.policy.load().gate.check_access(&mut session);
        }
        let app = setup_admin_router(state);

        let response = app.clone().oneshot(authed("/admin/sessions/tok/log")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let entries: Vec<crate::security::AccessLogEntry> = serde_json::from_slice(&body).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AccessAction::NormalAccess);
        assert_eq!(entries[0].timestamp, 50.0);

        let missing = app.oneshot(authed("/admin/sessions/nope/log")).await.unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_sessions_listing() {
        let state = state();
        state.sessions.get_or_create("a", 50.0).unwrap();
        let app = setup_admin_router(state);

        let response = app.oneshot(authed("/admin/sessions")).await.unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let sessions: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(sessions[0]["token"], "a");
        assert_eq!(sessions[0]["requests_last_hour"], 0);
    }
}
