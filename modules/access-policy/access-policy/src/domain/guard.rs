//! Per-navigation guard.
//!
//! Turns session state and an [`AccessDecision`] into the action the shell
//! must take. Inactivity and trial status are checked in the same pass, so
//! there are no separate timers to keep in sync.

use std::time::Duration;

use access_policy_sdk::{AccessDecision, AccessVerdict};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    pub idle_timeout: Duration,
    pub login_path: String,
    pub subscription_path: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_mins(5),
            login_path: "/login".to_owned(),
            subscription_path: "/subscription".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginReason {
    Unauthenticated,
    Idle,
}

impl LoginReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Idle => "idle",
        }
    }
}

/// Countdown notice rendered on WARN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialBanner {
    pub days_left: u32,
}

impl TrialBanner {
    #[must_use]
    pub fn message(&self) -> String {
        match self.days_left {
            1 => "Your free trial ends in 1 day.".to_owned(),
            n => format!("Your free trial ends in {n} days."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Proceed {
        decision: AccessDecision,
        banner: Option<TrialBanner>,
    },
    RedirectToLogin {
        reason: LoginReason,
        location: String,
    },
    RedirectToSubscription {
        decision: AccessDecision,
        location: String,
    },
}

impl GuardOutcome {
    /// Redirect target, if the shell must navigate away.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Proceed { .. } => None,
            Self::RedirectToLogin { location, .. }
            | Self::RedirectToSubscription { location, .. } => Some(location),
        }
    }
}

/// `true` when more than `idle_timeout` has passed since `last_activity`.
#[must_use]
pub fn is_idle(now: OffsetDateTime, last_activity: OffsetDateTime, idle_timeout: Duration) -> bool {
    let elapsed = now - last_activity;
    elapsed > idle_timeout
}

/// Session-level check performed before the policy is consulted.
///
/// Returns a login redirect when the session is idle, `None` otherwise.
#[must_use]
pub fn check_session(
    config: &GuardConfig,
    now: OffsetDateTime,
    last_activity: Option<OffsetDateTime>,
) -> Option<GuardOutcome> {
    let last = last_activity?;
    is_idle(now, last, config.idle_timeout).then(|| GuardOutcome::RedirectToLogin {
        reason: LoginReason::Idle,
        location: config.login_path.clone(),
    })
}

/// Map a decision to the shell action.
#[must_use]
pub fn outcome_for(config: &GuardConfig, decision: AccessDecision) -> GuardOutcome {
    match decision.verdict {
        AccessVerdict::Block => GuardOutcome::RedirectToSubscription {
            decision,
            location: config.subscription_path.clone(),
        },
        AccessVerdict::Warn => GuardOutcome::Proceed {
            decision,
            banner: decision
                .days_left_in_trial
                .map(|days_left| TrialBanner { days_left }),
        },
        AccessVerdict::Allow => GuardOutcome::Proceed {
            decision,
            banner: None,
        },
    }
}

/// Redirect for a request without identity.
#[must_use]
pub fn unauthenticated(config: &GuardConfig) -> GuardOutcome {
    GuardOutcome::RedirectToLogin {
        reason: LoginReason::Unauthenticated,
        location: config.login_path.clone(),
    }
}
