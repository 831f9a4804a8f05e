use access_policy_sdk::{SubscriptionRecord, SubscriptionStatus, TrialRecord};

use super::entity::{subscription, trial};

impl From<trial::Model> for TrialRecord {
    fn from(m: trial::Model) -> Self {
        Self {
            trial_start: m.trial_start,
            trial_end: m.trial_end,
        }
    }
}

/// Rows are validated here, at the fetch boundary: an unknown status is an error.
impl TryFrom<subscription::Model> for SubscriptionRecord {
    type Error = anyhow::Error;

    fn try_from(m: subscription::Model) -> Result<Self, Self::Error> {
        let status = SubscriptionStatus::parse(&m.status)
            .ok_or_else(|| anyhow::anyhow!("unknown subscription status '{}'", m.status))?;
        Ok(Self {
            id: m.id,
            user_id: m.user_id,
            tenant_id: m.tenant_id,
            start_date: m.start_date,
            end_date: m.end_date,
            amount_paid_cents: m.amount_paid_cents,
            currency: m.currency,
            status,
        })
    }
}

impl From<&SubscriptionRecord> for subscription::ActiveModel {
    fn from(r: &SubscriptionRecord) -> Self {
        use sea_orm::ActiveValue::Set;
        Self {
            id: Set(r.id),
            tenant_id: Set(r.tenant_id),
            user_id: Set(r.user_id),
            start_date: Set(r.start_date),
            end_date: Set(r.end_date),
            amount_paid_cents: Set(r.amount_paid_cents),
            currency: Set(r.currency.clone()),
            status: Set(r.status.as_str().to_owned()),
        }
    }
}
