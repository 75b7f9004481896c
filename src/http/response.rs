//! Block page returned when the gate denies a request.
//!
//! The response replaces the whole page; nothing of the requested page is
//! rendered after a denial.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::security::DenyReason;

pub const BLOCK_TITLE: &str = "Access Restricted";
pub const BLOCK_SUGGESTION: &str =
    "If you are a regular user, please try again later. If this keeps happening, contact the administrator.";

/// Seconds until `until`, rounded up, never below 1.
fn retry_after_secs(until: f64, now: f64) -> u64 {
    (until - now).ceil().max(1.0) as u64
}

/// Build the block page for `reason` as observed at `now`.
pub fn blocked_response(reason: DenyReason, now: f64) -> Response {
    let status = match reason {
        DenyReason::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        DenyReason::SuspiciousBehavior | DenyReason::AutomatedClient => StatusCode::FORBIDDEN,
    };

    let body = format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title></head><body>\
         <div class=\"blocked\"><h2>{title}</h2><p class=\"reason\">{reason}</p><p>{suggestion}</p></div>\
         </body></html>",
        title = BLOCK_TITLE,
        reason = reason.message(),
        suggestion = BLOCK_SUGGESTION,
    );

    let mut response = (status, Html(body)).into_response();
    if let DenyReason::RateLimited { until } = reason {
        response.headers_mut().insert(
            header::RETRY_AFTER,
            HeaderValue::from(retry_after_secs(until, now)),
        );
    }
    response
}
