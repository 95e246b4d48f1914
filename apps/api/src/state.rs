use std::sync::Arc;

use brandroom_application::{
    AuthorizationService, LimitService, RoleProvisioner, WorkspaceService,
};
use brandroom_domain::{PermissionRegistry, PlanCatalog};
use brandroom_infrastructure::{
    PostgresBrandRepository, PostgresSubscriptionRepository, PostgresUsageCounter,
    PostgresWorkspaceRepository, PostgresWorkspaceRoleRepository,
};
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub workspace_service: WorkspaceService,
    pub authorization_service: AuthorizationService,
    pub limit_service: LimitService,
    pub identity_header: Arc<str>,
}

impl AppState {
    pub fn postgres(pool: PgPool, identity_header: &str) -> Self {
        let provisioner = RoleProvisioner::new(Arc::new(PermissionRegistry::standard()));
        let authorization_service =
            AuthorizationService::new(Arc::new(PostgresWorkspaceRoleRepository::new(pool.clone())));
        let workspace_service = WorkspaceService::new(
            authorization_service.clone(),
            Arc::new(PostgresWorkspaceRepository::new(pool.clone(), provisioner)),
            Arc::new(PostgresBrandRepository::new(pool.clone())),
        );
        let limit_service = LimitService::new(
            Arc::new(PlanCatalog::standard()),
            Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
            Arc::new(PostgresUsageCounter::new(pool)),
        );

        Self {
            workspace_service,
            authorization_service,
            limit_service,
            identity_header: Arc::from(identity_header),
        }
    }
}

#[cfg(test)]
impl AppState {
    pub fn in_memory(store: Arc<brandroom_infrastructure::InMemoryWorkspaceStore>) -> Self {
        let authorization_service = AuthorizationService::new(store.clone());
        let workspace_service =
            WorkspaceService::new(authorization_service.clone(), store.clone(), store.clone());
        let limit_service = LimitService::new(
            Arc::new(PlanCatalog::standard()),
            store.clone(),
            store,
        );

        Self {
            workspace_service,
            authorization_service,
            limit_service,
            identity_header: Arc::from(crate::api_config::DEFAULT_IDENTITY_HEADER),
        }
    }
}
