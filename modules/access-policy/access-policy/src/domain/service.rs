use std::sync::Arc;

use access_policy_sdk::{
    AccessEvaluation, Fallback, Identity, NewSubscription, SubscriptionRecord, TrialRecord,
};
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::clock::{Clock, SystemClock};
use super::error::DomainError;
use super::guard::{self, GuardConfig, GuardOutcome};
use super::policy::{AccessPolicy, PolicyParams, latest_subscription};
use super::repo::{SubscriptionRepository, TrialRepository};

#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub policy: PolicyParams,
    pub guard: GuardConfig,
}

/// Result of a navigation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub outcome: GuardOutcome,
    /// `None` when the session check redirected before the policy ran.
    pub evaluation: Option<AccessEvaluation>,
}

/// Domain service: fetches an identity's records and runs the policy on them.
pub struct Service {
    trials: Arc<dyn TrialRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    clock: Arc<dyn Clock>,
    policy: AccessPolicy,
    guard: GuardConfig,
}

impl Service {
    pub fn new(
        trials: Arc<dyn TrialRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        config: ServiceConfig,
    ) -> Self {
        Self::with_clock(trials, subscriptions, Arc::new(SystemClock), config)
    }

    pub fn with_clock(
        trials: Arc<dyn TrialRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        clock: Arc<dyn Clock>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            trials,
            subscriptions,
            clock,
            policy: AccessPolicy::new(config.policy),
            guard: config.guard,
        }
    }

    /// Evaluate access for `identity` now.
    ///
    /// Never fails. A missing trial row is replaced by the default trial. The
    /// two fetches degrade independently: subscriptions that were read still
    /// count, while the stored trial is only trusted when both reads succeed,
    /// so a failed fetch can never turn into a block.
    #[instrument(skip_all, fields(user_id = %identity.user_id, tenant_id = %identity.tenant_id))]
    pub async fn evaluate(&self, identity: &Identity) -> AccessEvaluation {
        let now = self.clock.now();

        let (trial, subscriptions) = tokio::join!(
            self.trials.find(identity),
            self.subscriptions.list(identity)
        );

        let (subscriptions, subscriptions_failed) = match subscriptions {
            Ok(subscriptions) => (subscriptions, false),
            Err(e) => {
                warn!(error = %e, "Failed to fetch subscriptions; assuming none");
                (Vec::new(), true)
            }
        };

        let (trial, fallback) = match trial {
            Ok(Some(trial)) if !subscriptions_failed => (trial, None),
            Ok(Some(_)) => (self.policy.default_trial(now), Some(Fallback::FetchFailed)),
            Ok(None) => {
                debug!("No trial row; using default trial");
                let fallback = if subscriptions_failed {
                    Fallback::FetchFailed
                } else {
                    Fallback::MissingTrial
                };
                (self.policy.default_trial(now), Some(fallback))
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch trial; assuming default trial");
                (self.policy.default_trial(now), Some(Fallback::FetchFailed))
            }
        };

        let decision = self.policy.evaluate(now, Some(&trial), &subscriptions);
        debug!(
            verdict = decision.verdict.as_str(),
            days_left = ?decision.days_left_in_trial,
            active = decision.has_active_subscription,
            "Access evaluated"
        );

        AccessEvaluation {
            decision,
            evaluated_at: now,
            trial_ends_at: Some(trial.trial_end),
            subscription_ends_at: latest_subscription(&subscriptions).map(|s| s.end_date),
            fallback,
        }
    }

    /// Full navigation check: session presence, inactivity, then the policy.
    ///
    /// The policy is only evaluated once the session itself is acceptable.
    pub async fn navigate(
        &self,
        identity: Option<&Identity>,
        last_activity: Option<OffsetDateTime>,
    ) -> Navigation {
        let Some(identity) = identity else {
            return Navigation {
                outcome: guard::unauthenticated(&self.guard),
                evaluation: None,
            };
        };

        if let Some(outcome) = guard::check_session(&self.guard, self.clock.now(), last_activity)
        {
            info!(user_id = %identity.user_id, "Session idle; redirecting to login");
            return Navigation {
                outcome,
                evaluation: None,
            };
        }

        let evaluation = self.evaluate(identity).await;
        Navigation {
            outcome: guard::outcome_for(&self.guard, evaluation.decision),
            evaluation: Some(evaluation),
        }
    }

    pub async fn guard(
        &self,
        identity: Option<&Identity>,
        last_activity: Option<OffsetDateTime>,
    ) -> GuardOutcome {
        self.navigate(identity, last_activity).await.outcome
    }

    /// Create the trial window at signup.
    #[instrument(skip_all, fields(user_id = %identity.user_id))]
    pub async fn start_trial(&self, identity: &Identity) -> Result<TrialRecord, DomainError> {
        let trial = TrialRecord::starting_at(self.clock.now(), self.policy.params().trial_length);

        if !self.trials.insert(identity, trial).await? {
            return Err(DomainError::trial_already_started(identity.user_id));
        }

        info!(trial_end = %trial.trial_end, "Trial started");
        Ok(trial)
    }

    pub async fn get_trial(&self, identity: &Identity) -> Result<Option<TrialRecord>, DomainError> {
        Ok(self.trials.find(identity).await?)
    }

    /// Record a completed payment period.
    #[instrument(skip_all, fields(user_id = %identity.user_id))]
    pub async fn record_subscription(
        &self,
        identity: &Identity,
        new_subscription: NewSubscription,
    ) -> Result<SubscriptionRecord, DomainError> {
        validate_subscription(&new_subscription)?;

        let record = SubscriptionRecord {
            id: Uuid::new_v4(),
            user_id: identity.user_id,
            tenant_id: identity.tenant_id,
            start_date: new_subscription.start_date,
            end_date: new_subscription.end_date,
            amount_paid_cents: new_subscription.amount_paid_cents,
            currency: new_subscription.currency.to_ascii_uppercase(),
            status: new_subscription.status,
        };

        let stored = self.subscriptions.insert(record).await?;
        info!(
            subscription_id = %stored.id,
            end_date = %stored.end_date,
            "Subscription recorded"
        );
        Ok(stored)
    }

    /// Subscriptions for `identity`, latest end date first.
    pub async fn list_subscriptions(
        &self,
        identity: &Identity,
    ) -> Result<Vec<SubscriptionRecord>, DomainError> {
        let mut subscriptions = self.subscriptions.list(identity).await?;
        subscriptions.sort_by_key(|s| std::cmp::Reverse(s.end_date));
        Ok(subscriptions)
    }
}

fn validate_subscription(new_subscription: &NewSubscription) -> Result<(), DomainError> {
    if new_subscription.end_date <= new_subscription.start_date {
        return Err(DomainError::validation(
            "end_date",
            "must be after start_date",
        ));
    }
    if new_subscription.amount_paid_cents < 0 {
        return Err(DomainError::validation(
            "amount_paid_cents",
            "must not be negative",
        ));
    }
    let currency = new_subscription.currency.as_bytes();
    if currency.len() != 3 || !currency.iter().all(u8::is_ascii_alphabetic) {
        return Err(DomainError::validation(
            "currency",
            "must be a three-letter ISO 4217 code",
        ));
    }
    Ok(())
}
