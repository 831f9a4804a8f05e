//! Public models for the access-policy module.
//!
//! These are transport-agnostic data structures that define the contract
//! between the access-policy module and its consumers. REST DTOs live in the
//! module crate and convert from these.

use time::OffsetDateTime;
use uuid::Uuid;

/// Authenticated user as reported by the session provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
}

/// Trial window created at signup. Never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialRecord {
    pub trial_start: OffsetDateTime,
    pub trial_end: OffsetDateTime,
}

impl TrialRecord {
    /// Trial starting at `start` and lasting `length`.
    #[must_use]
    pub fn starting_at(start: OffsetDateTime, length: time::Duration) -> Self {
        Self {
            trial_start: start,
            trial_end: start + length,
        }
    }
}

/// Status reported by the payment callback.
///
/// Informational only: whether a subscription grants access is decided by
/// its `end_date` alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Cancelled,
    Refunded,
}

impl SubscriptionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    /// Parse the stored representation. Unknown values yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "cancelled" => Some(Self::Cancelled),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }
}

/// A completed payment period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub start_date: OffsetDateTime,
    pub end_date: OffsetDateTime,
    /// Amount in minor currency units (cents).
    pub amount_paid_cents: i64,
    pub currency: String,
    pub status: SubscriptionStatus,
}

impl SubscriptionRecord {
    /// A subscription is active iff its end date is strictly after `now`.
    #[must_use]
    pub fn is_active_at(&self, now: OffsetDateTime) -> bool {
        self.end_date > now
    }
}

/// Data for recording a completed payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub start_date: OffsetDateTime,
    pub end_date: OffsetDateTime,
    pub amount_paid_cents: i64,
    pub currency: String,
    pub status: SubscriptionStatus,
}

/// Tri-state outcome of the access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessVerdict {
    /// Unrestricted access.
    Allow,
    /// Access allowed with a visible trial countdown.
    Warn,
    /// Access denied; the user must pay.
    Block,
}

impl AccessVerdict {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "ALLOW",
            Self::Warn => "WARN",
            Self::Block => "BLOCK",
        }
    }
}

/// Result of a single policy evaluation. Never persisted or cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    pub verdict: AccessVerdict,
    /// `None` when an active subscription makes the trial irrelevant.
    pub days_left_in_trial: Option<u32>,
    pub has_active_subscription: bool,
}

/// Why a decision was computed from synthesised data rather than stored rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// The identity has no trial row; a default trial anchored at `now` was used.
    MissingTrial,
    /// Trial or subscription rows could not be fetched; access was not blocked.
    FetchFailed,
}

impl Fallback {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingTrial => "missing_trial",
            Self::FetchFailed => "fetch_failed",
        }
    }
}

/// Decision plus the context the shell needs to render it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessEvaluation {
    pub decision: AccessDecision,
    pub evaluated_at: OffsetDateTime,
    /// End of the trial that was used for the decision (synthesised or stored).
    pub trial_ends_at: Option<OffsetDateTime>,
    /// Latest subscription end date, active or not.
    pub subscription_ends_at: Option<OffsetDateTime>,
    pub fallback: Option<Fallback>,
}
