//! Identity forwarded by the session provider.
//!
//! The upstream gateway validates the session and forwards the identity in
//! headers. A request without a complete, well-formed identity is treated as
//! unauthenticated.

use access_policy_sdk::Identity;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use uuid::Uuid;

use super::error::{ErrorCode, Problem, current_trace_id};

pub const TENANT_ID_HEADER: &str = "x-tenant-id";
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Extractor for the authenticated identity. Rejects with 401.
pub struct Authn(pub Identity);

impl<S: Send + Sync> FromRequestParts<S> for Authn {
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity_from_headers(&parts.headers)
            .map(Authn)
            .ok_or_else(|| {
                ErrorCode::UNAUTHENTICATED.with_context(
                    "Missing or malformed session identity",
                    parts.uri.path(),
                    current_trace_id(),
                )
            })
    }
}

#[must_use]
pub fn identity_from_headers(headers: &HeaderMap) -> Option<Identity> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    let tenant_id = Uuid::parse_str(header(TENANT_ID_HEADER)?).ok()?;
    let user_id = Uuid::parse_str(header(USER_ID_HEADER)?).ok()?;
    let email = header(USER_EMAIL_HEADER)?.trim();
    if email.is_empty() {
        return None;
    }

    Some(Identity {
        user_id,
        tenant_id,
        email: email.to_owned(),
    })
}
