#[cfg(test)]
mod tests {
    use super::super::clock::FixedClock;
    use super::super::guard::{GuardOutcome, LoginReason};
    use super::super::*;
    use access_policy_sdk::{
        AccessVerdict, Fallback, Identity, NewSubscription, SubscriptionRecord,
        SubscriptionStatus, TrialRecord,
    };
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use time::macros::datetime;
    use time::{Duration, OffsetDateTime};
    use tracing_test::traced_test;
    use uuid::Uuid;

    #[derive(Default)]
    struct MockTrials {
        row: Mutex<Option<TrialRecord>>,
        fail: bool,
    }

    #[async_trait]
    impl repo::TrialRepository for MockTrials {
        async fn find(&self, _identity: &Identity) -> anyhow::Result<Option<TrialRecord>> {
            if self.fail {
                anyhow::bail!("connection reset");
            }
            Ok(*self.row.lock().unwrap())
        }

        async fn insert(&self, _identity: &Identity, trial: TrialRecord) -> anyhow::Result<bool> {
            let mut row = self.row.lock().unwrap();
            if row.is_some() {
                return Ok(false);
            }
            *row = Some(trial);
            Ok(true)
        }
    }

    #[derive(Default)]
    struct MockSubscriptions {
        rows: Mutex<Vec<SubscriptionRecord>>,
        fail: bool,
    }

    #[async_trait]
    impl repo::SubscriptionRepository for MockSubscriptions {
        async fn list(&self, _identity: &Identity) -> anyhow::Result<Vec<SubscriptionRecord>> {
            if self.fail {
                anyhow::bail!("timeout");
            }
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn insert(&self, record: SubscriptionRecord) -> anyhow::Result<SubscriptionRecord> {
            self.rows.lock().unwrap().push(record.clone());
            Ok(record)
        }
    }

    fn identity() -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            email: "agent@example.com".to_owned(),
        }
    }

    fn service_at(
        now: OffsetDateTime,
        trials: MockTrials,
        subscriptions: MockSubscriptions,
    ) -> service::Service {
        service::Service::with_clock(
            Arc::new(trials),
            Arc::new(subscriptions),
            Arc::new(FixedClock(now)),
            service::ServiceConfig::default(),
        )
    }

    fn jan_trial() -> MockTrials {
        MockTrials {
            row: Mutex::new(Some(TrialRecord {
                trial_start: datetime!(2024-01-01 0:00 UTC),
                trial_end: datetime!(2024-01-15 0:00 UTC),
            })),
            fail: false,
        }
    }

    fn payment(start: OffsetDateTime, end: OffsetDateTime) -> NewSubscription {
        NewSubscription {
            start_date: start,
            end_date: end,
            amount_paid_cents: 4_900,
            currency: "usd".to_owned(),
            status: SubscriptionStatus::Active,
        }
    }

    #[tokio::test]
    async fn evaluate_uses_stored_trial() {
        let svc = service_at(
            datetime!(2024-01-13 0:00 UTC),
            jan_trial(),
            MockSubscriptions::default(),
        );

        let evaluation = svc.evaluate(&identity()).await;

        assert_eq!(evaluation.decision.verdict, AccessVerdict::Warn);
        assert_eq!(evaluation.decision.days_left_in_trial, Some(2));
        assert_eq!(evaluation.trial_ends_at, Some(datetime!(2024-01-15 0:00 UTC)));
        assert_eq!(evaluation.subscription_ends_at, None);
        assert_eq!(evaluation.fallback, None);
    }

    #[tokio::test]
    async fn evaluate_missing_trial_uses_named_fallback() {
        let now = datetime!(2024-02-01 8:00 UTC);
        let svc = service_at(now, MockTrials::default(), MockSubscriptions::default());

        let evaluation = svc.evaluate(&identity()).await;

        assert_eq!(evaluation.decision.verdict, AccessVerdict::Allow);
        assert_eq!(evaluation.decision.days_left_in_trial, Some(14));
        assert_eq!(evaluation.fallback, Some(Fallback::MissingTrial));
        assert_eq!(evaluation.trial_ends_at, Some(now + Duration::days(14)));
    }

    #[tokio::test]
    #[traced_test]
    async fn evaluate_fetch_failure_never_blocks() {
        let trials = MockTrials {
            fail: true,
            ..MockTrials::default()
        };
        let svc = service_at(
            datetime!(2030-01-01 0:00 UTC),
            trials,
            MockSubscriptions::default(),
        );

        let evaluation = svc.evaluate(&identity()).await;

        assert_eq!(evaluation.decision.verdict, AccessVerdict::Allow);
        assert_eq!(evaluation.decision.days_left_in_trial, Some(14));
        assert_eq!(evaluation.fallback, Some(Fallback::FetchFailed));
        assert!(logs_contain("Failed to fetch trial"));
    }

    #[tokio::test]
    async fn evaluate_subscription_fetch_failure_ignores_stored_trial() {
        let subscriptions = MockSubscriptions {
            fail: true,
            ..MockSubscriptions::default()
        };
        let svc = service_at(datetime!(2024-01-20 0:00 UTC), jan_trial(), subscriptions);

        let evaluation = svc.evaluate(&identity()).await;

        assert_eq!(evaluation.decision.verdict, AccessVerdict::Allow);
        assert_eq!(evaluation.fallback, Some(Fallback::FetchFailed));
    }

    #[tokio::test]
    async fn evaluate_trial_fetch_failure_keeps_active_subscription() {
        let who = identity();
        let subscriptions = MockSubscriptions {
            rows: Mutex::new(vec![SubscriptionRecord {
                id: Uuid::new_v4(),
                user_id: who.user_id,
                tenant_id: who.tenant_id,
                start_date: datetime!(2024-01-01 0:00 UTC),
                end_date: datetime!(2024-06-01 0:00 UTC),
                amount_paid_cents: 4_900,
                currency: "USD".to_owned(),
                status: SubscriptionStatus::Active,
            }]),
            fail: false,
        };
        let trials = MockTrials {
            fail: true,
            ..MockTrials::default()
        };
        let svc = service_at(datetime!(2024-02-01 0:00 UTC), trials, subscriptions);

        let evaluation = svc.evaluate(&who).await;

        assert_eq!(evaluation.decision.verdict, AccessVerdict::Allow);
        assert!(evaluation.decision.has_active_subscription);
        assert_eq!(evaluation.decision.days_left_in_trial, None);
        assert_eq!(
            evaluation.subscription_ends_at,
            Some(datetime!(2024-06-01 0:00 UTC))
        );
        assert_eq!(evaluation.fallback, Some(Fallback::FetchFailed));
    }

    #[tokio::test]
    async fn evaluate_reports_latest_subscription_end() {
        let now = datetime!(2024-01-16 0:00 UTC);
        let svc = service_at(now, jan_trial(), MockSubscriptions::default());
        let who = identity();

        svc.record_subscription(
            &who,
            payment(datetime!(2024-01-16 0:00 UTC), datetime!(2024-06-01 0:00 UTC)),
        )
        .await
        .unwrap();
        svc.record_subscription(
            &who,
            payment(datetime!(2023-01-16 0:00 UTC), datetime!(2023-06-01 0:00 UTC)),
        )
        .await
        .unwrap();

        let evaluation = svc.evaluate(&who).await;

        assert_eq!(evaluation.decision.verdict, AccessVerdict::Allow);
        assert!(evaluation.decision.has_active_subscription);
        assert_eq!(evaluation.decision.days_left_in_trial, None);
        assert_eq!(
            evaluation.subscription_ends_at,
            Some(datetime!(2024-06-01 0:00 UTC))
        );
    }

    #[tokio::test]
    async fn start_trial_writes_fourteen_day_window_once() {
        let now = datetime!(2024-03-01 10:00 UTC);
        let svc = service_at(now, MockTrials::default(), MockSubscriptions::default());
        let who = identity();

        let trial = svc.start_trial(&who).await.unwrap();
        assert_eq!(trial.trial_start, now);
        assert_eq!(trial.trial_end, now + Duration::days(14));
        assert_eq!(svc.get_trial(&who).await.unwrap(), Some(trial));

        let err = svc.start_trial(&who).await.unwrap_err();
        assert!(matches!(err, error::DomainError::TrialAlreadyStarted { .. }));
    }

    #[tokio::test]
    async fn record_subscription_rejects_inverted_dates() {
        let svc = service_at(
            datetime!(2024-03-01 10:00 UTC),
            MockTrials::default(),
            MockSubscriptions::default(),
        );

        let err = svc
            .record_subscription(
                &identity(),
                payment(datetime!(2024-03-01 0:00 UTC), datetime!(2024-03-01 0:00 UTC)),
            )
            .await
            .unwrap_err();

        assert!(
            matches!(err, error::DomainError::Validation { ref field, .. } if field == "end_date")
        );
    }

    #[tokio::test]
    async fn record_subscription_rejects_bad_amount_and_currency() {
        let svc = service_at(
            datetime!(2024-03-01 10:00 UTC),
            MockTrials::default(),
            MockSubscriptions::default(),
        );
        let who = identity();
        let base = payment(datetime!(2024-03-01 0:00 UTC), datetime!(2024-04-01 0:00 UTC));

        let negative = NewSubscription {
            amount_paid_cents: -1,
            ..base.clone()
        };
        assert!(svc.record_subscription(&who, negative).await.is_err());

        let currency = NewSubscription {
            currency: "US".to_owned(),
            ..base
        };
        assert!(svc.record_subscription(&who, currency).await.is_err());
    }

    #[tokio::test]
    async fn record_subscription_scopes_to_identity_and_normalises_currency() {
        let svc = service_at(
            datetime!(2024-03-01 10:00 UTC),
            MockTrials::default(),
            MockSubscriptions::default(),
        );
        let who = identity();

        let stored = svc
            .record_subscription(
                &who,
                payment(datetime!(2024-03-01 0:00 UTC), datetime!(2024-04-01 0:00 UTC)),
            )
            .await
            .unwrap();

        assert_eq!(stored.user_id, who.user_id);
        assert_eq!(stored.tenant_id, who.tenant_id);
        assert_eq!(stored.currency, "USD");
    }

    #[tokio::test]
    async fn list_subscriptions_orders_latest_first() {
        let svc = service_at(
            datetime!(2024-03-01 10:00 UTC),
            MockTrials::default(),
            MockSubscriptions::default(),
        );
        let who = identity();
        for (start, end) in [
            (datetime!(2024-01-01 0:00 UTC), datetime!(2024-02-01 0:00 UTC)),
            (datetime!(2024-03-01 0:00 UTC), datetime!(2024-04-01 0:00 UTC)),
            (datetime!(2024-02-01 0:00 UTC), datetime!(2024-03-01 0:00 UTC)),
        ] {
            svc.record_subscription(&who, payment(start, end))
                .await
                .unwrap();
        }

        let listed = svc.list_subscriptions(&who).await.unwrap();
        let ends: Vec<_> = listed.iter().map(|s| s.end_date).collect();
        assert_eq!(
            ends,
            vec![
                datetime!(2024-04-01 0:00 UTC),
                datetime!(2024-03-01 0:00 UTC),
                datetime!(2024-02-01 0:00 UTC),
            ]
        );
    }

    #[tokio::test]
    async fn guard_without_identity_redirects_to_login() {
        let svc = service_at(
            datetime!(2024-01-13 0:00 UTC),
            jan_trial(),
            MockSubscriptions::default(),
        );

        let outcome = svc.guard(None, None).await;

        assert_eq!(
            outcome,
            GuardOutcome::RedirectToLogin {
                reason: LoginReason::Unauthenticated,
                location: "/login".to_owned(),
            }
        );
    }

    #[tokio::test]
    async fn guard_idle_session_wins_over_policy() {
        let now = datetime!(2024-01-20 0:00 UTC);
        let svc = service_at(now, jan_trial(), MockSubscriptions::default());

        let outcome = svc
            .guard(Some(&identity()), Some(now - Duration::minutes(6)))
            .await;

        assert!(matches!(
            outcome,
            GuardOutcome::RedirectToLogin {
                reason: LoginReason::Idle,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn guard_expired_trial_redirects_to_subscription() {
        let now = datetime!(2024-01-20 0:00 UTC);
        let svc = service_at(now, jan_trial(), MockSubscriptions::default());

        let outcome = svc
            .guard(Some(&identity()), Some(now - Duration::minutes(1)))
            .await;

        assert_eq!(outcome.location(), Some("/subscription"));
    }

    #[tokio::test]
    async fn guard_warn_carries_banner() {
        let svc = service_at(
            datetime!(2024-01-13 0:00 UTC),
            jan_trial(),
            MockSubscriptions::default(),
        );

        let outcome = svc.guard(Some(&identity()), None).await;

        match outcome {
            GuardOutcome::Proceed { banner, decision } => {
                assert_eq!(decision.verdict, AccessVerdict::Warn);
                assert_eq!(banner.map(|b| b.days_left), Some(2));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
