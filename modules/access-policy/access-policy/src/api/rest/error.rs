use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
pub use modkit_errors::Problem;

use crate::domain::error::DomainError;

/// Error catalog entry: problem type URI, title and status.
pub struct ErrorCode {
    type_url: &'static str,
    code: &'static str,
    title: &'static str,
    status: StatusCode,
}

impl ErrorCode {
    pub const TRIAL_NOT_FOUND: Self = Self {
        type_url: "urn:crm:access-policy:trial-not-found:v1",
        code: "TRIAL_NOT_FOUND",
        title: "Trial not found",
        status: StatusCode::NOT_FOUND,
    };
    pub const TRIAL_ALREADY_STARTED: Self = Self {
        type_url: "urn:crm:access-policy:trial-already-started:v1",
        code: "TRIAL_ALREADY_STARTED",
        title: "Trial already started",
        status: StatusCode::CONFLICT,
    };
    pub const VALIDATION: Self = Self {
        type_url: "urn:crm:access-policy:validation:v1",
        code: "VALIDATION",
        title: "Validation error",
        status: StatusCode::UNPROCESSABLE_ENTITY,
    };
    pub const BAD_REQUEST: Self = Self {
        type_url: "urn:crm:access-policy:bad-request:v1",
        code: "BAD_REQUEST",
        title: "Malformed request",
        status: StatusCode::BAD_REQUEST,
    };
    pub const UNAUTHENTICATED: Self = Self {
        type_url: "urn:crm:access-policy:unauthenticated:v1",
        code: "UNAUTHENTICATED",
        title: "Authentication required",
        status: StatusCode::UNAUTHORIZED,
    };
    pub const SESSION_IDLE: Self = Self {
        type_url: "urn:crm:access-policy:session-idle:v1",
        code: "SESSION_IDLE",
        title: "Session expired due to inactivity",
        status: StatusCode::UNAUTHORIZED,
    };
    pub const SUBSCRIPTION_REQUIRED: Self = Self {
        type_url: "urn:crm:access-policy:subscription-required:v1",
        code: "SUBSCRIPTION_REQUIRED",
        title: "Subscription required",
        status: StatusCode::PAYMENT_REQUIRED,
    };
    pub const INTERNAL_DATABASE: Self = Self {
        type_url: "urn:crm:access-policy:internal-database:v1",
        code: "INTERNAL_DATABASE",
        title: "Internal error",
        status: StatusCode::INTERNAL_SERVER_ERROR,
    };

    pub fn with_context(
        &self,
        detail: impl Into<String>,
        instance: &str,
        trace_id: Option<String>,
    ) -> Problem {
        let problem = Problem::new(self.status, self.title, detail)
            .with_type(self.type_url)
            .with_code(self.code)
            .with_instance(instance);
        match trace_id {
            Some(id) => problem.with_trace_id(id),
            None => problem,
        }
    }
}

/// Problem response with an optional `Location` header for redirects.
#[derive(Debug)]
pub struct ApiError {
    pub problem: Problem,
    pub location: Option<String>,
}

impl ApiError {
    #[must_use]
    pub fn redirect(problem: Problem, location: impl Into<String>) -> Self {
        Self {
            problem,
            location: Some(location.into()),
        }
    }
}

impl From<Problem> for ApiError {
    fn from(problem: Problem) -> Self {
        Self {
            problem,
            location: None,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Problem::from(e).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let location = self
            .location
            .as_deref()
            .and_then(|l| HeaderValue::from_str(l).ok());
        let mut response = self.problem.into_response();
        if let Some(location) = location {
            response.headers_mut().insert(header::LOCATION, location);
        }
        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

pub(crate) fn current_trace_id() -> Option<String> {
    tracing::Span::current()
        .id()
        .map(|id| id.into_u64().to_string())
}

/// Map domain error to RFC 9457 Problem using the catalog
pub fn domain_error_to_problem(e: &DomainError, instance: &str) -> Problem {
    let trace_id = current_trace_id();

    match e {
        DomainError::TrialNotFound { .. } => ErrorCode::TRIAL_NOT_FOUND.with_context(
            "No trial recorded for this user",
            instance,
            trace_id,
        ),
        DomainError::TrialAlreadyStarted { .. } => ErrorCode::TRIAL_ALREADY_STARTED.with_context(
            "A trial was already started for this user",
            instance,
            trace_id,
        ),
        DomainError::Validation { field, message } => ErrorCode::VALIDATION.with_context(
            format!("Validation error on '{field}': {message}"),
            instance,
            trace_id,
        ),
        DomainError::Database { .. } => {
            tracing::error!(error = ?e, "Database error occurred");
            ErrorCode::INTERNAL_DATABASE.with_context(
                "An internal database error occurred",
                instance,
                trace_id,
            )
        }
    }
}

/// Implement From<DomainError> for Problem so `?` works in handlers
impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        domain_error_to_problem(&e, "/")
    }
}
