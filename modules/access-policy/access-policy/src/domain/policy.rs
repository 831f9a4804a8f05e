//! Trial/subscription access policy.
//!
//! A pure decision function from `(now, trial, subscriptions)` to an
//! [`AccessDecision`]. No I/O, no clock reads, no mutation of inputs: callers
//! fetch the records beforehand and pass the evaluation time explicitly.

use access_policy_sdk::{AccessDecision, AccessVerdict, SubscriptionRecord, TrialRecord};
use time::{Duration, OffsetDateTime};

/// Default trial length granted at signup.
pub const DEFAULT_TRIAL_DAYS: i64 = 14;

/// Default warning window before the trial ends.
pub const DEFAULT_WARN_WITHIN_DAYS: u32 = 3;

const NANOS_PER_DAY: u128 = 86_400 * 1_000_000_000;

/// Tunable policy parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyParams {
    /// Length of the synthesised trial when no trial row exists.
    pub trial_length: Duration,
    /// Days-left threshold (inclusive) for the WARN verdict.
    pub warn_within_days: u32,
}

impl Default for PolicyParams {
    fn default() -> Self {
        Self {
            trial_length: Duration::days(DEFAULT_TRIAL_DAYS),
            warn_within_days: DEFAULT_WARN_WITHIN_DAYS,
        }
    }
}

/// Access policy evaluator bound to a set of parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy {
    params: PolicyParams,
}

impl AccessPolicy {
    #[must_use]
    pub fn new(params: PolicyParams) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn params(&self) -> PolicyParams {
        self.params
    }

    /// Trial used when the identity has no trial row: starts at `now`.
    #[must_use]
    pub fn default_trial(&self, now: OffsetDateTime) -> TrialRecord {
        TrialRecord::starting_at(now, self.params.trial_length)
    }

    /// Decide access for one evaluation.
    ///
    /// An active subscription always wins. Otherwise the verdict follows the
    /// days left in the trial (stored, or synthesised when `trial` is `None`).
    #[must_use]
    pub fn evaluate(
        &self,
        now: OffsetDateTime,
        trial: Option<&TrialRecord>,
        subscriptions: &[SubscriptionRecord],
    ) -> AccessDecision {
        if subscriptions.iter().any(|s| s.is_active_at(now)) {
            return AccessDecision {
                verdict: AccessVerdict::Allow,
                days_left_in_trial: None,
                has_active_subscription: true,
            };
        }

        let trial = trial.copied().unwrap_or_else(|| self.default_trial(now));
        let days_left = days_left(now, trial.trial_end);

        let verdict = if days_left == 0 {
            AccessVerdict::Block
        } else if days_left <= self.params.warn_within_days {
            AccessVerdict::Warn
        } else {
            AccessVerdict::Allow
        };

        AccessDecision {
            verdict,
            days_left_in_trial: Some(days_left),
            has_active_subscription: false,
        }
    }
}

/// Evaluate with the default 14-day trial and 3-day warning window.
#[must_use]
pub fn evaluate_access(
    now: OffsetDateTime,
    trial: Option<&TrialRecord>,
    subscriptions: &[SubscriptionRecord],
) -> AccessDecision {
    AccessPolicy::default().evaluate(now, trial, subscriptions)
}

/// Whole days until `trial_end`, rounded up, never negative.
#[must_use]
pub fn days_left(now: OffsetDateTime, trial_end: OffsetDateTime) -> u32 {
    let remaining = (trial_end - now).whole_nanoseconds();
    let Ok(remaining) = u128::try_from(remaining) else {
        return 0;
    };
    u32::try_from(remaining.div_ceil(NANOS_PER_DAY)).unwrap_or(u32::MAX)
}

/// The subscription with the latest end date.
#[must_use]
pub fn latest_subscription(subscriptions: &[SubscriptionRecord]) -> Option<&SubscriptionRecord> {
    subscriptions.iter().max_by_key(|s| s.end_date)
}
