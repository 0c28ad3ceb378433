use std::collections::BTreeSet;
use std::sync::Arc;

use sqlx::PgPool;
use vendorhub_application::{
    AuditRepository, AuthorizationService, CatalogRepository, CatalogService, MembershipService,
    OwnershipService, PolicyStore, UserRepository, UserService,
};
use vendorhub_core::AppError;
use vendorhub_infrastructure::{
    InMemoryCatalogRepository, InMemoryPolicyStore, InMemoryUserRepository,
    PostgresAuditRepository, PostgresCatalogRepository, PostgresPolicyStore,
    PostgresUserRepository, TracingAuditRepository,
};

use crate::api_config::{ApiConfig, StorageBackend};
use crate::state::AppState;

use super::connect_and_migrate;

struct Adapters {
    policy_store: Arc<dyn PolicyStore>,
    catalog: Arc<dyn CatalogRepository>,
    users: Arc<dyn UserRepository>,
    audit: Arc<dyn AuditRepository>,
}

impl Adapters {
    fn postgres(pool: &PgPool) -> Self {
        Self {
            policy_store: Arc::new(PostgresPolicyStore::new(pool.clone())),
            catalog: Arc::new(PostgresCatalogRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            audit: Arc::new(PostgresAuditRepository::new(pool.clone())),
        }
    }

    fn memory() -> Self {
        Self {
            policy_store: Arc::new(InMemoryPolicyStore::new()),
            catalog: Arc::new(InMemoryCatalogRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
            audit: Arc::new(TracingAuditRepository::new()),
        }
    }

    fn into_state(
        self,
        storage_backend: StorageBackend,
        gateway_secret: &str,
        super_admin_subjects: BTreeSet<String>,
    ) -> AppState {
        AppState {
            authorization_service: AuthorizationService::new(self.policy_store.clone()),
            ownership_service: OwnershipService::new(self.catalog.clone()),
            catalog_service: CatalogService::new(
                self.catalog.clone(),
                self.policy_store.clone(),
                self.audit.clone(),
            ),
            membership_service: MembershipService::new(
                self.policy_store,
                self.catalog,
                self.users.clone(),
                self.audit,
            ),
            user_service: UserService::new(self.users),
            storage_backend,
            gateway_secret: Arc::from(gateway_secret),
            super_admin_subjects: Arc::new(super_admin_subjects),
        }
    }
}

pub async fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let database_url = match config.storage_backend {
        StorageBackend::Memory => {
            return Ok(build_memory_app_state(
                config.gateway_secret.as_str(),
                config.bootstrap_super_admin_subjects.clone(),
            ));
        }
        StorageBackend::Postgres => config
            .database_url
            .as_deref()
            .ok_or_else(|| AppError::Validation("DATABASE_URL is required".to_owned()))?,
    };

    let pool = connect_and_migrate(database_url).await?;
    Ok(Adapters::postgres(&pool).into_state(
        StorageBackend::Postgres,
        config.gateway_secret.as_str(),
        config.bootstrap_super_admin_subjects.clone(),
    ))
}

/// Builds state over fresh in-memory adapters.
pub fn build_memory_app_state(
    gateway_secret: &str,
    super_admin_subjects: BTreeSet<String>,
) -> AppState {
    Adapters::memory().into_state(StorageBackend::Memory, gateway_secret, super_admin_subjects)
}
