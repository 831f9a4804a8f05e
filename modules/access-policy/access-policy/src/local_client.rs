//! Local implementation of `AccessPolicyClientV1`.
//!
//! Used by other modules in the same process. It delegates to the domain
//! service and converts errors to SDK error types.

use std::sync::Arc;

use access_policy_sdk::{
    AccessEvaluation, AccessPolicyClientV1, AccessPolicyError, Identity, NewSubscription,
    SubscriptionRecord, TrialRecord,
};
use async_trait::async_trait;

use crate::domain::service::Service;

pub struct AccessPolicyLocalClient {
    service: Arc<Service>,
}

impl AccessPolicyLocalClient {
    #[must_use]
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl AccessPolicyClientV1 for AccessPolicyLocalClient {
    async fn evaluate_access(
        &self,
        identity: &Identity,
    ) -> Result<AccessEvaluation, AccessPolicyError> {
        Ok(self.service.evaluate(identity).await)
    }

    async fn start_trial(&self, identity: &Identity) -> Result<TrialRecord, AccessPolicyError> {
        self.service.start_trial(identity).await.map_err(Into::into)
    }

    async fn get_trial(
        &self,
        identity: &Identity,
    ) -> Result<Option<TrialRecord>, AccessPolicyError> {
        self.service.get_trial(identity).await.map_err(Into::into)
    }

    async fn record_subscription(
        &self,
        identity: &Identity,
        new_subscription: NewSubscription,
    ) -> Result<SubscriptionRecord, AccessPolicyError> {
        self.service
            .record_subscription(identity, new_subscription)
            .await
            .map_err(Into::into)
    }

    async fn list_subscriptions(
        &self,
        identity: &Identity,
    ) -> Result<Vec<SubscriptionRecord>, AccessPolicyError> {
        self.service
            .list_subscriptions(identity)
            .await
            .map_err(Into::into)
    }
}
