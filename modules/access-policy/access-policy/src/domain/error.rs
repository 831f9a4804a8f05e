use access_policy_sdk::AccessPolicyError;
use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Trial not found for user {user_id}")]
    TrialNotFound { user_id: Uuid },

    #[error("Trial already started for user {user_id}")]
    TrialAlreadyStarted { user_id: Uuid },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    #[must_use]
    pub fn trial_not_found(user_id: Uuid) -> Self {
        Self::TrialNotFound { user_id }
    }

    #[must_use]
    pub fn trial_already_started(user_id: Uuid) -> Self {
        Self::TrialAlreadyStarted { user_id }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for DomainError {
    fn from(e: anyhow::Error) -> Self {
        Self::database(e.to_string())
    }
}

/// Convert domain errors to SDK errors for public API consumption.
impl From<DomainError> for AccessPolicyError {
    fn from(domain_error: DomainError) -> Self {
        match domain_error {
            DomainError::TrialNotFound { .. } => AccessPolicyError::not_found("trial"),
            DomainError::TrialAlreadyStarted { .. } => {
                AccessPolicyError::conflict("trial already started")
            }
            DomainError::Validation { field, message } => {
                AccessPolicyError::validation(format!("{field}: {message}"))
            }
            DomainError::Database { .. } => AccessPolicyError::internal(),
        }
    }
}
