use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, OriginalUri, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::domain::error::DomainError;
use crate::domain::guard::GuardOutcome;
use crate::domain::service::Service;

use super::authn::Authn;
use super::dto::{AccessDto, AccessQuery, CreateSubscriptionReq, SubscriptionDto, TrialDto};
use super::error::{
    ApiError, ApiResult, ErrorCode, Problem, current_trace_id, domain_error_to_problem,
};

/// Evaluate the access policy for the calling user.
#[utoipa::path(
    get,
    path = "/access-policy/v1/access",
    params(
        ("last_activity" = Option<String>, Query, description = "RFC 3339 time of last user activity"),
    ),
    responses(
        (status = 200, description = "Access evaluated", body = AccessDto),
        (status = 400, description = "Malformed last_activity", body = Problem),
        (status = 401, description = "Unauthenticated or idle session", body = Problem),
    ),
    tag = "Access"
)]
pub async fn get_access(
    Authn(identity): Authn,
    Extension(svc): Extension<Arc<Service>>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<AccessQuery>,
) -> ApiResult<Json<AccessDto>> {
    let last_activity = query.last_activity().map_err(|e| {
        ErrorCode::BAD_REQUEST.with_context(
            format!("'last_activity' must be an RFC 3339 timestamp: {e}"),
            uri.path(),
            current_trace_id(),
        )
    })?;
    let navigation = svc.navigate(Some(&identity), last_activity).await;

    match (navigation.evaluation, &navigation.outcome) {
        (Some(evaluation), outcome) => Ok(Json(AccessDto::new(&evaluation, outcome))),
        (None, GuardOutcome::RedirectToLogin { location, .. }) => Err(ApiError::redirect(
            ErrorCode::SESSION_IDLE.with_context(
                "Session expired due to inactivity",
                uri.path(),
                current_trace_id(),
            ),
            location.clone(),
        )),
        (None, _) => Err(ErrorCode::UNAUTHENTICATED
            .with_context("Session is not acceptable", uri.path(), current_trace_id())
            .into()),
    }
}

/// Start the free trial for the calling user (signup).
#[utoipa::path(
    post,
    path = "/access-policy/v1/trial",
    responses(
        (status = 201, description = "Trial started", body = TrialDto),
        (status = 401, description = "Unauthenticated", body = Problem),
        (status = 409, description = "Trial already started", body = Problem),
    ),
    tag = "Access"
)]
pub async fn start_trial(
    Authn(identity): Authn,
    Extension(svc): Extension<Arc<Service>>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<impl IntoResponse> {
    let trial = svc
        .start_trial(&identity)
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    Ok((StatusCode::CREATED, Json(TrialDto::from(trial))))
}

/// Read the stored trial of the calling user.
#[utoipa::path(
    get,
    path = "/access-policy/v1/trial",
    responses(
        (status = 200, description = "Trial found", body = TrialDto),
        (status = 401, description = "Unauthenticated", body = Problem),
        (status = 404, description = "No trial recorded", body = Problem),
    ),
    tag = "Access"
)]
pub async fn get_trial(
    Authn(identity): Authn,
    Extension(svc): Extension<Arc<Service>>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<TrialDto>> {
    let trial = svc
        .get_trial(&identity)
        .await
        .and_then(|t| t.ok_or_else(|| DomainError::trial_not_found(identity.user_id)))
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    Ok(Json(trial.into()))
}

/// Record a completed payment for the calling user.
#[utoipa::path(
    post,
    path = "/access-policy/v1/subscriptions",
    request_body = CreateSubscriptionReq,
    responses(
        (status = 201, description = "Subscription recorded", body = SubscriptionDto),
        (status = 401, description = "Unauthenticated", body = Problem),
        (status = 422, description = "Invalid subscription data", body = Problem),
    ),
    tag = "Subscriptions"
)]
pub async fn create_subscription(
    Authn(identity): Authn,
    Extension(svc): Extension<Arc<Service>>,
    OriginalUri(uri): OriginalUri,
    Json(req): Json<CreateSubscriptionReq>,
) -> ApiResult<impl IntoResponse> {
    let stored = svc
        .record_subscription(&identity, req.into())
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    Ok((StatusCode::CREATED, Json(SubscriptionDto::from(stored))))
}

/// List subscriptions of the calling user, latest end date first.
#[utoipa::path(
    get,
    path = "/access-policy/v1/subscriptions",
    responses(
        (status = 200, description = "Subscriptions", body = [SubscriptionDto]),
        (status = 401, description = "Unauthenticated", body = Problem),
    ),
    tag = "Subscriptions"
)]
pub async fn list_subscriptions(
    Authn(identity): Authn,
    Extension(svc): Extension<Arc<Service>>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<Vec<SubscriptionDto>>> {
    let subscriptions = svc
        .list_subscriptions(&identity)
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    Ok(Json(subscriptions.into_iter().map(Into::into).collect()))
}
