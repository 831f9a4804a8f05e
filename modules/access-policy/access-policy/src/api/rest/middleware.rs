//! Navigation guard for protected CRM routes.
//!
//! Every request to a wrapped router runs one guard pass: identity, then
//! inactivity, then the trial/subscription policy.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::domain::guard::{GuardOutcome, LoginReason};
use crate::domain::service::Service;

use super::authn::identity_from_headers;
use super::error::{ApiError, ErrorCode, current_trace_id};

/// Client-reported time of the last user interaction (RFC 3339).
pub const LAST_ACTIVITY_HEADER: &str = "x-last-activity";
/// Set on responses while the trial is close to ending.
pub const TRIAL_DAYS_LEFT_HEADER: &str = "x-trial-days-left";

/// Reads the last-activity header. An unparseable value is an error, not absence.
fn last_activity(headers: &HeaderMap) -> Result<Option<OffsetDateTime>, String> {
    let Some(raw) = headers.get(LAST_ACTIVITY_HEADER) else {
        return Ok(None);
    };
    raw.to_str()
        .ok()
        .and_then(|v| OffsetDateTime::parse(v.trim(), &Rfc3339).ok())
        .map(Some)
        .ok_or_else(|| format!("'{LAST_ACTIVITY_HEADER}' must be an RFC 3339 timestamp"))
}

/// Middleware guarding protected routes.
///
/// Redirect outcomes are answered directly with a problem response that
/// carries a `Location` header; the inner handler never runs for them.
pub async fn require_access(
    State(svc): State<Arc<Service>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();
    let identity = identity_from_headers(req.headers());
    let last_activity = match last_activity(req.headers()) {
        Ok(ts) => ts,
        Err(detail) => {
            tracing::debug!(path = %path, "Rejecting malformed last-activity header");
            return ErrorCode::BAD_REQUEST
                .with_context(detail, &path, current_trace_id())
                .into_response();
        }
    };

    let outcome = svc.guard(identity.as_ref(), last_activity).await;

    match outcome {
        GuardOutcome::RedirectToLogin { reason, location } => {
            tracing::info!(path = %path, reason = reason.as_str(), "Redirecting to login");
            let code = match reason {
                LoginReason::Unauthenticated => ErrorCode::UNAUTHENTICATED,
                LoginReason::Idle => ErrorCode::SESSION_IDLE,
            };
            let problem = code.with_context("Please sign in again", &path, current_trace_id());
            ApiError::redirect(problem, location).into_response()
        }
        GuardOutcome::RedirectToSubscription { location, .. } => {
            tracing::info!(path = %path, "Trial expired; redirecting to subscription");
            let problem = ErrorCode::SUBSCRIPTION_REQUIRED.with_context(
                "Your free trial has ended. Subscribe to continue.",
                &path,
                current_trace_id(),
            );
            ApiError::redirect(problem, location).into_response()
        }
        GuardOutcome::Proceed { banner, .. } => {
            let mut response = next.run(req).await;
            if let Some(banner) = banner {
                response
                    .headers_mut()
                    .insert(TRIAL_DAYS_LEFT_HEADER, HeaderValue::from(banner.days_left));
            }
            response
        }
    }
}
