use std::sync::Arc;
use std::time::Duration;

use brandroom_application::{
    BrandRepository, RoleProvisioner, SubscriptionRepository, UsageCounter, WorkspaceRepository,
    WorkspaceRoleRepository,
};
use brandroom_core::{AppError, BrandId, UserId, WorkspaceId};
use brandroom_domain::{BuiltInRole, PermissionRegistry, Plan, WorkspaceRole};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresWorkspaceRepository;
use crate::{
    PostgresBrandRepository, PostgresRoleProvisioningStore, PostgresSubscriptionRepository,
    PostgresUsageCounter, PostgresWorkspaceRoleRepository,
};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres workspace tests: {error}");
    }

    Some(pool)
}

fn repository(pool: &PgPool) -> PostgresWorkspaceRepository {
    PostgresWorkspaceRepository::new(
        pool.clone(),
        RoleProvisioner::new(Arc::new(PermissionRegistry::standard())),
    )
}

#[tokio::test]
async fn create_workspace_provisions_roles_subscription_and_owner() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let owner = UserId::new();
    let workspace = repository(&pool)
        .create_workspace(owner, "Postgres Workspace")
        .await
        .unwrap_or_else(|error| panic!("workspace creation failed: {error}"));

    let roles = PostgresWorkspaceRoleRepository::new(pool.clone());
    let member_role = roles
        .find_member_role(workspace.workspace_id, owner)
        .await;
    assert_eq!(member_role.ok().flatten(), Some(WorkspaceRole::Owner));

    let listed = roles
        .list_workspace_roles(workspace.workspace_id)
        .await
        .unwrap_or_default();
    assert_eq!(listed.len(), 3);
    let owner_role = listed
        .iter()
        .find(|role| role.key == BuiltInRole::Owner.key());
    assert_eq!(
        owner_role.map(|role| role.permission_keys.len()),
        Some(PermissionRegistry::standard().definitions().len())
    );

    let subscription = PostgresSubscriptionRepository::new(pool.clone())
        .find_subscription(workspace.workspace_id)
        .await
        .ok()
        .flatten();
    assert_eq!(subscription.map(|value| value.plan), Some(Plan::Free));
}

#[tokio::test]
async fn concurrent_reprovisioning_converges() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = repository(&pool);
    let workspace = repository
        .create_workspace(UserId::new(), "Concurrent Workspace")
        .await
        .unwrap_or_else(|error| panic!("workspace creation failed: {error}"));

    let (first, second) = tokio::join!(
        repository.reprovision_roles(workspace.workspace_id),
        repository.reprovision_roles(workspace.workspace_id)
    );
    assert!(first.is_ok());
    assert!(second.is_ok());

    let role_count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM workspace_roles
        WHERE workspace_id = $1
        "#,
    )
    .bind(workspace.workspace_id.as_uuid())
    .fetch_one(&pool)
    .await;
    assert_eq!(role_count.ok(), Some(3));
}

#[tokio::test]
async fn workspaces_created_concurrently_are_both_provisioned() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = repository(&pool);
    let (first, second) = tokio::join!(
        repository.create_workspace(UserId::new(), "First Tenant"),
        repository.create_workspace(UserId::new(), "Second Tenant")
    );

    let roles = PostgresWorkspaceRoleRepository::new(pool.clone());
    for workspace in [first, second] {
        let workspace =
            workspace.unwrap_or_else(|error| panic!("workspace creation failed: {error}"));
        let listed = roles
            .list_workspace_roles(workspace.workspace_id)
            .await
            .unwrap_or_default();
        assert_eq!(listed.len(), 3);
    }
}

#[tokio::test]
async fn open_provisioning_transaction_does_not_block_other_workspaces() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = repository(&pool);
    repository
        .create_workspace(UserId::new(), "Catalog Seed")
        .await
        .unwrap_or_else(|error| panic!("workspace creation failed: {error}"));

    let mut transaction = pool
        .begin()
        .await
        .unwrap_or_else(|error| panic!("failed to begin transaction: {error}"));
    let pending_workspace_id = WorkspaceId::new();
    let inserted = sqlx::query(
        r#"
        INSERT INTO workspaces (id, name)
        VALUES ($1, $2)
        "#,
    )
    .bind(pending_workspace_id.as_uuid())
    .bind("Pending Tenant")
    .execute(&mut *transaction)
    .await;
    assert!(inserted.is_ok());

    let provisioner = RoleProvisioner::new(Arc::new(PermissionRegistry::standard()));
    let mut store = PostgresRoleProvisioningStore::new(&mut *transaction);
    let provisioned = provisioner
        .ensure_default_workspace_roles(&mut store, pending_workspace_id)
        .await;
    assert!(provisioned.is_ok());

    let other = tokio::time::timeout(
        Duration::from_secs(5),
        repository.create_workspace(UserId::new(), "Parallel Tenant"),
    )
    .await;
    assert!(matches!(other, Ok(Ok(_))));

    let rolled_back = transaction.rollback().await;
    assert!(rolled_back.is_ok());
}

#[tokio::test]
async fn duplicate_membership_is_conflict() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = repository(&pool);
    let owner = UserId::new();
    let workspace = repository
        .create_workspace(owner, "Membership Workspace")
        .await
        .unwrap_or_else(|error| panic!("workspace creation failed: {error}"));

    let result = repository
        .add_member(workspace.workspace_id, owner, WorkspaceRole::Member)
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let missing = repository
        .remove_member(workspace.workspace_id, UserId::new())
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn usage_counter_counts_brands_and_scoped_accounts() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let workspace = repository(&pool)
        .create_workspace(UserId::new(), "Usage Workspace")
        .await
        .unwrap_or_else(|error| panic!("workspace creation failed: {error}"));
    let brands = PostgresBrandRepository::new(pool.clone());
    let brand = brands
        .create_brand(workspace.workspace_id, "Coffee Co")
        .await
        .unwrap_or_else(|error| panic!("brand creation failed: {error}"));
    let connected = brands
        .connect_social_account(workspace.workspace_id, brand.brand_id, "@coffeeco")
        .await;
    assert!(connected.is_ok());

    let counter = PostgresUsageCounter::new(pool.clone());
    let brand_count = counter
        .count_current_usage("brand", workspace.workspace_id, None)
        .await;
    assert_eq!(brand_count.ok(), Some(1));

    let account_count = counter
        .count_current_usage(
            "socialAccount",
            workspace.workspace_id,
            Some(brand.brand_id),
        )
        .await;
    assert_eq!(account_count.ok(), Some(1));

    let member_count = counter
        .count_current_usage("member", workspace.workspace_id, None)
        .await;
    assert_eq!(member_count.ok(), Some(1));

    let missing_brand = counter
        .count_current_usage(
            "socialAccount",
            workspace.workspace_id,
            Some(BrandId::new()),
        )
        .await;
    assert!(matches!(missing_brand, Err(AppError::BrandNotFound(_))));
}

#[tokio::test]
async fn workspace_wide_account_usage_is_busiest_brand() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let workspace = repository(&pool)
        .create_workspace(UserId::new(), "Agency Workspace")
        .await
        .unwrap_or_else(|error| panic!("workspace creation failed: {error}"));
    let brands = PostgresBrandRepository::new(pool.clone());
    for (brand_name, account_total) in [("Coffee Co", 3), ("Tea Co", 2), ("Juice Co", 1)] {
        let brand = brands
            .create_brand(workspace.workspace_id, brand_name)
            .await
            .unwrap_or_else(|error| panic!("brand creation failed: {error}"));
        for index in 0..account_total {
            let connected = brands
                .connect_social_account(
                    workspace.workspace_id,
                    brand.brand_id,
                    &format!("@account{index}"),
                )
                .await;
            assert!(connected.is_ok());
        }
    }

    let busiest = PostgresUsageCounter::new(pool.clone())
        .count_current_usage("socialAccount", workspace.workspace_id, None)
        .await;
    assert_eq!(busiest.ok(), Some(3));

    let empty = repository(&pool)
        .create_workspace(UserId::new(), "Empty Workspace")
        .await
        .unwrap_or_else(|error| panic!("workspace creation failed: {error}"));
    let none = PostgresUsageCounter::new(pool.clone())
        .count_current_usage("socialAccount", empty.workspace_id, None)
        .await;
    assert_eq!(none.ok(), Some(0));
}

#[tokio::test]
async fn post_usage_counts_only_scheduled_posts() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let workspace = repository(&pool)
        .create_workspace(UserId::new(), "Publishing Workspace")
        .await
        .unwrap_or_else(|error| panic!("workspace creation failed: {error}"));
    let brand = PostgresBrandRepository::new(pool.clone())
        .create_brand(workspace.workspace_id, "Coffee Co")
        .await
        .unwrap_or_else(|error| panic!("brand creation failed: {error}"));

    for status in ["scheduled", "scheduled", "draft", "published"] {
        let inserted = sqlx::query(
            r#"
            INSERT INTO posts (workspace_id, brand_id, status, scheduled_for)
            VALUES ($1, $2, $3, now() + interval '1 day')
            "#,
        )
        .bind(workspace.workspace_id.as_uuid())
        .bind(brand.brand_id.as_uuid())
        .bind(status)
        .execute(&pool)
        .await;
        assert!(inserted.is_ok());
    }

    let scheduled = PostgresUsageCounter::new(pool.clone())
        .count_current_usage("post", workspace.workspace_id, None)
        .await;
    assert_eq!(scheduled.ok(), Some(2));
}
