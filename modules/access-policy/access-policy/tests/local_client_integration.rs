#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Integration tests for `AccessPolicyLocalClient`.
//!
//! These tests verify that the local client delegates to the domain service
//! and converts `DomainError` into `AccessPolicyError`.

mod support;

use access_policy::local_client::AccessPolicyLocalClient;
use access_policy_sdk::{AccessPolicyClientV1, AccessPolicyError, AccessVerdict, Fallback};
use support::{TestContext, identity, paid_period};
use time::macros::datetime;

#[tokio::test]
async fn evaluate_without_trial_row_uses_default_trial() {
    let ctx = TestContext::new().await;
    let client = AccessPolicyLocalClient::new(ctx.service.clone());

    let evaluation = client.evaluate_access(&identity()).await.unwrap();

    assert_eq!(evaluation.decision.verdict, AccessVerdict::Allow);
    assert_eq!(evaluation.decision.days_left_in_trial, Some(14));
    assert_eq!(evaluation.fallback, Some(Fallback::MissingTrial));
}

#[tokio::test]
async fn trial_lifecycle_from_signup_to_block() {
    let ctx = TestContext::new().await;
    let user = identity();

    let signup = AccessPolicyLocalClient::new(ctx.at(datetime!(2024-01-01 0:00 UTC)));
    let trial = signup.start_trial(&user).await.unwrap();
    assert_eq!(trial.trial_end, datetime!(2024-01-15 0:00 UTC));

    let day_13 = AccessPolicyLocalClient::new(ctx.at(datetime!(2024-01-13 0:00 UTC)));
    let warn = day_13.evaluate_access(&user).await.unwrap();
    assert_eq!(warn.decision.verdict, AccessVerdict::Warn);
    assert_eq!(warn.decision.days_left_in_trial, Some(2));
    assert_eq!(warn.fallback, None);

    let day_16 = AccessPolicyLocalClient::new(ctx.at(datetime!(2024-01-16 0:00 UTC)));
    let block = day_16.evaluate_access(&user).await.unwrap();
    assert_eq!(block.decision.verdict, AccessVerdict::Block);
    assert_eq!(block.decision.days_left_in_trial, Some(0));
}

#[tokio::test]
async fn active_subscription_overrides_expired_trial() {
    let ctx = TestContext::new().await;
    let user = identity();
    let client = AccessPolicyLocalClient::new(ctx.at(datetime!(2024-01-16 0:00 UTC)));

    client.start_trial(&user).await.unwrap();
    client
        .record_subscription(
            &user,
            paid_period(
                datetime!(2024-01-16 0:00 UTC),
                datetime!(2024-06-01 0:00 UTC),
                9_900,
            ),
        )
        .await
        .unwrap();

    let evaluation = client.evaluate_access(&user).await.unwrap();
    assert_eq!(evaluation.decision.verdict, AccessVerdict::Allow);
    assert!(evaluation.decision.has_active_subscription);
    assert_eq!(evaluation.decision.days_left_in_trial, None);
    assert_eq!(
        evaluation.subscription_ends_at,
        Some(datetime!(2024-06-01 0:00 UTC))
    );
}

#[tokio::test]
async fn errors_are_mapped_to_sdk_errors() {
    let ctx = TestContext::new().await;
    let client = AccessPolicyLocalClient::new(ctx.service.clone());
    let user = identity();

    client.start_trial(&user).await.unwrap();
    let err = client.start_trial(&user).await.unwrap_err();
    assert!(matches!(err, AccessPolicyError::Conflict { .. }));

    let err = client
        .record_subscription(
            &user,
            paid_period(
                datetime!(2024-02-01 0:00 UTC),
                datetime!(2024-01-01 0:00 UTC),
                100,
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AccessPolicyError::Validation { .. }));
}

#[tokio::test]
async fn list_subscriptions_latest_first() {
    let ctx = TestContext::new().await;
    let client = AccessPolicyLocalClient::new(ctx.service.clone());
    let user = identity();

    for (start, end) in [
        (datetime!(2024-01-01 0:00 UTC), datetime!(2024-02-01 0:00 UTC)),
        (datetime!(2024-03-01 0:00 UTC), datetime!(2024-04-01 0:00 UTC)),
        (datetime!(2024-02-01 0:00 UTC), datetime!(2024-03-01 0:00 UTC)),
    ] {
        client
            .record_subscription(&user, paid_period(start, end, 4_900))
            .await
            .unwrap();
    }

    let ends: Vec<_> = client
        .list_subscriptions(&user)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.end_date)
        .collect();
    assert_eq!(
        ends,
        vec![
            datetime!(2024-04-01 0:00 UTC),
            datetime!(2024-03-01 0:00 UTC),
            datetime!(2024-02-01 0:00 UTC),
        ]
    );
    assert_eq!(client.get_trial(&user).await.unwrap(), None);
}
