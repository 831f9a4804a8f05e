use access_policy_sdk::{Identity, SubscriptionRecord, TrialRecord};
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    SqlErr,
};

use crate::domain::repo::{SubscriptionRepository, TrialRepository};

use super::entity::{subscription, trial};

pub struct SeaOrmTrialRepository {
    db: DatabaseConnection,
}

impl SeaOrmTrialRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TrialRepository for SeaOrmTrialRepository {
    async fn find(&self, identity: &Identity) -> anyhow::Result<Option<TrialRecord>> {
        let row = trial::Entity::find()
            .filter(trial::Column::TenantId.eq(identity.tenant_id))
            .filter(trial::Column::UserId.eq(identity.user_id))
            .one(&self.db)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn insert(&self, identity: &Identity, record: TrialRecord) -> anyhow::Result<bool> {
        if self.find(identity).await?.is_some() {
            return Ok(false);
        }

        // A concurrent signup can still race us to the primary key.
        let active_model = trial::ActiveModel {
            tenant_id: ActiveValue::Set(identity.tenant_id),
            user_id: ActiveValue::Set(identity.user_id),
            trial_start: ActiveValue::Set(record.trial_start),
            trial_end: ActiveValue::Set(record.trial_end),
        };

        match active_model.insert(&self.db).await {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

pub struct SeaOrmSubscriptionRepository {
    db: DatabaseConnection,
}

impl SeaOrmSubscriptionRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SubscriptionRepository for SeaOrmSubscriptionRepository {
    async fn list(&self, identity: &Identity) -> anyhow::Result<Vec<SubscriptionRecord>> {
        let rows = subscription::Entity::find()
            .filter(subscription::Column::TenantId.eq(identity.tenant_id))
            .filter(subscription::Column::UserId.eq(identity.user_id))
            .all(&self.db)
            .await?;

        rows.into_iter().map(SubscriptionRecord::try_from).collect()
    }

    async fn insert(&self, record: SubscriptionRecord) -> anyhow::Result<SubscriptionRecord> {
        let model = subscription::ActiveModel::from(&record)
            .insert(&self.db)
            .await?;

        SubscriptionRecord::try_from(model)
    }
}
