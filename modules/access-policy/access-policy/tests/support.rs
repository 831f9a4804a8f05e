#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Test support utilities for `access_policy` integration tests.
//!
//! Provides in-memory databases, identities and a service wired to the
//! `SeaORM` repositories.

#![allow(dead_code)] // Support module provides utilities that may not all be used

use std::sync::Arc;

use access_policy::domain::clock::FixedClock;
use access_policy::domain::service::{Service, ServiceConfig};
use access_policy::infra::storage::{SeaOrmSubscriptionRepository, SeaOrmTrialRepository};
use access_policy_sdk::{Identity, NewSubscription, SubscriptionStatus};
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use time::OffsetDateTime;
use uuid::Uuid;

/// Fresh identity in its own tenant.
#[must_use]
pub fn identity() -> Identity {
    identity_in(Uuid::new_v4())
}

#[must_use]
pub fn identity_in(tenant_id: Uuid) -> Identity {
    Identity {
        user_id: Uuid::new_v4(),
        tenant_id,
        email: "agent@example.com".to_owned(),
    }
}

/// Create a fresh in-memory `SQLite` database with migrations applied.
///
/// # Panics
/// Panics if the database connection or migrations fail.
pub async fn inmem_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    access_policy::infra::storage::migrations::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

#[must_use]
pub fn paid_period(
    start_date: OffsetDateTime,
    end_date: OffsetDateTime,
    amount_paid_cents: i64,
) -> NewSubscription {
    NewSubscription {
        start_date,
        end_date,
        amount_paid_cents,
        currency: "usd".to_owned(),
        status: SubscriptionStatus::Active,
    }
}

pub struct TestContext {
    pub db: DatabaseConnection,
    pub service: Arc<Service>,
}

impl TestContext {
    /// Service on a fresh database with the real clock.
    pub async fn new() -> Self {
        let db = inmem_db().await;
        let service = Arc::new(Service::new(
            Arc::new(SeaOrmTrialRepository::new(db.clone())),
            Arc::new(SeaOrmSubscriptionRepository::new(db.clone())),
            ServiceConfig::default(),
        ));
        Self { db, service }
    }

    /// Service sharing `self.db` but frozen at `now`.
    #[must_use]
    pub fn at(&self, now: OffsetDateTime) -> Arc<Service> {
        Arc::new(Service::with_clock(
            Arc::new(SeaOrmTrialRepository::new(self.db.clone())),
            Arc::new(SeaOrmSubscriptionRepository::new(self.db.clone())),
            Arc::new(FixedClock(now)),
            ServiceConfig::default(),
        ))
    }
}
