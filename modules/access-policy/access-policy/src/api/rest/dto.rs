use access_policy_sdk::{
    AccessEvaluation, AccessVerdict, Fallback, NewSubscription, SubscriptionRecord,
    SubscriptionStatus, TrialRecord,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::guard::GuardOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerdictDto {
    Allow,
    Warn,
    Block,
}

impl From<AccessVerdict> for VerdictDto {
    fn from(v: AccessVerdict) -> Self {
        match v {
            AccessVerdict::Allow => Self::Allow,
            AccessVerdict::Warn => Self::Warn,
            AccessVerdict::Block => Self::Block,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FallbackDto {
    MissingTrial,
    FetchFailed,
}

impl From<Fallback> for FallbackDto {
    fn from(f: Fallback) -> Self {
        match f {
            Fallback::MissingTrial => Self::MissingTrial,
            Fallback::FetchFailed => Self::FetchFailed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatusDto {
    #[default]
    Active,
    Cancelled,
    Refunded,
}

impl From<SubscriptionStatus> for SubscriptionStatusDto {
    fn from(s: SubscriptionStatus) -> Self {
        match s {
            SubscriptionStatus::Active => Self::Active,
            SubscriptionStatus::Cancelled => Self::Cancelled,
            SubscriptionStatus::Refunded => Self::Refunded,
        }
    }
}

impl From<SubscriptionStatusDto> for SubscriptionStatus {
    fn from(s: SubscriptionStatusDto) -> Self {
        match s {
            SubscriptionStatusDto::Active => Self::Active,
            SubscriptionStatusDto::Cancelled => Self::Cancelled,
            SubscriptionStatusDto::Refunded => Self::Refunded,
        }
    }
}

/// REST DTO for an access evaluation plus the shell action derived from it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessDto {
    pub verdict: VerdictDto,
    pub days_left_in_trial: Option<u32>,
    pub has_active_subscription: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub evaluated_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub trial_ends_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub subscription_ends_at: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackDto>,
    /// Where the shell must navigate, if anywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    /// Countdown notice to render on WARN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

impl AccessDto {
    #[must_use]
    pub fn new(evaluation: &AccessEvaluation, outcome: &GuardOutcome) -> Self {
        let banner = match outcome {
            GuardOutcome::Proceed {
                banner: Some(banner),
                ..
            } => Some(banner.message()),
            _ => None,
        };
        Self {
            verdict: evaluation.decision.verdict.into(),
            days_left_in_trial: evaluation.decision.days_left_in_trial,
            has_active_subscription: evaluation.decision.has_active_subscription,
            evaluated_at: evaluation.evaluated_at,
            trial_ends_at: evaluation.trial_ends_at,
            subscription_ends_at: evaluation.subscription_ends_at,
            fallback: evaluation.fallback.map(Into::into),
            redirect: outcome.location().map(ToOwned::to_owned),
            banner,
        }
    }
}

/// Query parameters for the access endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessQuery {
    /// Time of the user's last interaction (RFC 3339).
    #[serde(default)]
    pub last_activity: Option<String>,
}

impl AccessQuery {
    /// Parsed `last_activity`; kept as text so a bad value maps to a problem response.
    ///
    /// # Errors
    /// Returns the parse error when the value is not RFC 3339.
    pub fn last_activity(&self) -> Result<Option<OffsetDateTime>, time::error::Parse> {
        self.last_activity
            .as_deref()
            .map(|raw| OffsetDateTime::parse(raw.trim(), &Rfc3339))
            .transpose()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrialDto {
    #[serde(with = "time::serde::rfc3339")]
    pub trial_start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub trial_end: OffsetDateTime,
}

impl From<TrialRecord> for TrialDto {
    fn from(t: TrialRecord) -> Self {
        Self {
            trial_start: t.trial_start,
            trial_end: t.trial_end,
        }
    }
}

/// REST DTO for recording a completed payment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSubscriptionReq {
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
    pub amount_paid_cents: i64,
    pub currency: String,
    #[serde(default)]
    pub status: SubscriptionStatusDto,
}

impl From<CreateSubscriptionReq> for NewSubscription {
    fn from(req: CreateSubscriptionReq) -> Self {
        Self {
            start_date: req.start_date,
            end_date: req.end_date,
            amount_paid_cents: req.amount_paid_cents,
            currency: req.currency,
            status: req.status.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
    pub amount_paid_cents: i64,
    pub currency: String,
    pub status: SubscriptionStatusDto,
}

impl From<SubscriptionRecord> for SubscriptionDto {
    fn from(s: SubscriptionRecord) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            tenant_id: s.tenant_id,
            start_date: s.start_date,
            end_date: s.end_date,
            amount_paid_cents: s.amount_paid_cents,
            currency: s.currency,
            status: s.status.into(),
        }
    }
}
