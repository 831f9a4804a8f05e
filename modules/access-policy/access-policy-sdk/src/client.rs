//! `AccessPolicyClientV1` trait definition.
//!
//! This trait defines the public API for the `access_policy` module.
//! Every call is made on behalf of an authenticated [`Identity`]; rows are
//! scoped to that identity's tenant and user.

use async_trait::async_trait;

use crate::errors::AccessPolicyError;
use crate::models::{AccessEvaluation, Identity, NewSubscription, SubscriptionRecord, TrialRecord};

/// Public API trait for the `access_policy` module.
///
/// ```ignore
/// let client: Arc<dyn AccessPolicyClientV1> = module.client()?;
/// let evaluation = client.evaluate_access(&identity).await?;
/// ```
#[async_trait]
pub trait AccessPolicyClientV1: Send + Sync {
    /// Evaluate the access policy for `identity` at the current time.
    ///
    /// Fetch failures never surface here: they degrade to the default trial.
    async fn evaluate_access(
        &self,
        identity: &Identity,
    ) -> Result<AccessEvaluation, AccessPolicyError>;

    /// Create the trial window for a freshly signed-up identity.
    async fn start_trial(&self, identity: &Identity) -> Result<TrialRecord, AccessPolicyError>;

    /// Get the stored trial, if any.
    async fn get_trial(&self, identity: &Identity)
    -> Result<Option<TrialRecord>, AccessPolicyError>;

    /// Record a completed payment.
    async fn record_subscription(
        &self,
        identity: &Identity,
        new_subscription: NewSubscription,
    ) -> Result<SubscriptionRecord, AccessPolicyError>;

    /// List subscriptions, latest end date first.
    async fn list_subscriptions(
        &self,
        identity: &Identity,
    ) -> Result<Vec<SubscriptionRecord>, AccessPolicyError>;
}
