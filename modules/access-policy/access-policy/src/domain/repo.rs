use access_policy_sdk::{Identity, SubscriptionRecord, TrialRecord};
use async_trait::async_trait;

/// Persistence for trial windows. At most one row per identity.
///
/// Every method is scoped to the identity's `(tenant_id, user_id)`.
#[async_trait]
pub trait TrialRepository: Send + Sync {
    async fn find(&self, identity: &Identity) -> anyhow::Result<Option<TrialRecord>>;

    /// Insert the trial row. Returns `false` if one already exists.
    async fn insert(&self, identity: &Identity, trial: TrialRecord) -> anyhow::Result<bool>;
}

/// Persistence for completed payment periods.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn list(&self, identity: &Identity) -> anyhow::Result<Vec<SubscriptionRecord>>;

    async fn insert(&self, record: SubscriptionRecord) -> anyhow::Result<SubscriptionRecord>;
}
