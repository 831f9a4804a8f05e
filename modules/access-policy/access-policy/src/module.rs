use std::sync::Arc;

use access_policy_sdk::AccessPolicyClientV1;
use arc_swap::ArcSwapOption;
use axum::Router;
use axum::middleware::from_fn_with_state;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::{middleware, routes};
use crate::config::AccessPolicyConfig;
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{SeaOrmSubscriptionRepository, SeaOrmTrialRepository};
use crate::local_client::AccessPolicyLocalClient;

/// Composition root of the access-policy module.
pub struct AccessPolicyModule {
    // Set once by `init`, read on every request.
    service: ArcSwapOption<Service>,
}

impl Default for AccessPolicyModule {
    fn default() -> Self {
        Self {
            service: ArcSwapOption::from(None),
        }
    }
}

impl Clone for AccessPolicyModule {
    fn clone(&self) -> Self {
        Self {
            service: ArcSwapOption::new(self.service.load().as_ref().map(Clone::clone)),
        }
    }
}

impl AccessPolicyModule {
    /// Validate config, run migrations and wire the service.
    ///
    /// # Errors
    /// Fails on invalid configuration or when migrations cannot be applied.
    pub async fn init(
        &self,
        cfg: &AccessPolicyConfig,
        db: DatabaseConnection,
    ) -> anyhow::Result<()> {
        info!("Initializing access_policy module");

        cfg.validate()
            .map_err(|e| anyhow::anyhow!("invalid access_policy config: {e}"))?;
        debug!(
            trial_days = cfg.trial_days,
            warn_within_days = cfg.warn_within_days,
            idle_timeout = ?cfg.idle_timeout,
            "Loaded access_policy config"
        );

        migrate(&db).await?;

        let service = Arc::new(Service::new(
            Arc::new(SeaOrmTrialRepository::new(db.clone())),
            Arc::new(SeaOrmSubscriptionRepository::new(db)),
            ServiceConfig {
                policy: cfg.policy_params(),
                guard: cfg.guard_config(),
            },
        ));
        self.service.store(Some(service));
        Ok(())
    }

    fn service(&self) -> anyhow::Result<Arc<Service>> {
        self.service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("access_policy module is not initialized"))
    }

    /// Mount the module's REST API on `router`.
    ///
    /// # Errors
    /// Fails when called before [`Self::init`].
    pub fn register_rest(&self, router: Router) -> anyhow::Result<Router> {
        info!("Registering access_policy REST routes");
        Ok(routes::register_routes(router, self.service()?))
    }

    /// Wrap `protected` so that every request passes the navigation guard.
    ///
    /// # Errors
    /// Fails when called before [`Self::init`].
    pub fn guard_layer(&self, protected: Router) -> anyhow::Result<Router> {
        Ok(protected.layer(from_fn_with_state(
            self.service()?,
            middleware::require_access,
        )))
    }

    /// In-process client for other modules.
    ///
    /// # Errors
    /// Fails when called before [`Self::init`].
    pub fn client(&self) -> anyhow::Result<Arc<dyn AccessPolicyClientV1>> {
        Ok(Arc::new(AccessPolicyLocalClient::new(self.service()?)))
    }
}

async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
    info!("Running access_policy database migrations");
    Migrator::up(db, None).await?;
    info!("Access policy database migrations completed successfully");
    Ok(())
}
