//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_workspace_store;
mod postgres_brand_repository;
mod postgres_role_provisioning_store;
mod postgres_subscription_repository;
mod postgres_usage_counter;
mod postgres_workspace_repository;
mod postgres_workspace_role_repository;

pub use in_memory_workspace_store::InMemoryWorkspaceStore;
pub use postgres_brand_repository::PostgresBrandRepository;
pub use postgres_role_provisioning_store::PostgresRoleProvisioningStore;
pub use postgres_subscription_repository::PostgresSubscriptionRepository;
pub use postgres_usage_counter::PostgresUsageCounter;
pub use postgres_workspace_repository::PostgresWorkspaceRepository;
pub use postgres_workspace_role_repository::PostgresWorkspaceRoleRepository;
