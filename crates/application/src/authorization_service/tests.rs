use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use brandroom_core::{AppError, AppResult, RoleId, UserId, WorkspaceId};
use brandroom_domain::{BuiltInRole, PermissionRegistry, WorkspaceRole, permission_keys};

use super::{AuthorizationService, WorkspaceRoleDefinition, WorkspaceRoleRepository};

#[derive(Default)]
struct FakeWorkspaceRoleRepository {
    members: HashMap<(WorkspaceId, UserId), WorkspaceRole>,
    roles: HashMap<WorkspaceId, Vec<WorkspaceRoleDefinition>>,
}

#[async_trait]
impl WorkspaceRoleRepository for FakeWorkspaceRoleRepository {
    async fn find_member_role(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> AppResult<Option<WorkspaceRole>> {
        Ok(self.members.get(&(workspace_id, user_id)).copied())
    }

    async fn list_workspace_roles(
        &self,
        workspace_id: WorkspaceId,
    ) -> AppResult<Vec<WorkspaceRoleDefinition>> {
        Ok(self.roles.get(&workspace_id).cloned().unwrap_or_default())
    }
}

fn role_row(role: BuiltInRole, permission_keys: Vec<String>) -> WorkspaceRoleDefinition {
    WorkspaceRoleDefinition {
        role_id: RoleId::new(),
        key: role.key().to_owned(),
        name: role.display_name().to_owned(),
        description: role.description().to_owned(),
        built_in: true,
        order: role.order(),
        permission_keys,
    }
}

fn owner_role_row(registry: &PermissionRegistry) -> WorkspaceRoleDefinition {
    role_row(
        BuiltInRole::Owner,
        registry
            .all_permission_keys()
            .into_iter()
            .map(str::to_owned)
            .collect(),
    )
}

#[tokio::test]
async fn owner_resolves_every_registry_key() {
    let registry = PermissionRegistry::standard();
    let workspace_id = WorkspaceId::new();
    let user_id = UserId::new();
    let repository = FakeWorkspaceRoleRepository {
        members: HashMap::from([((workspace_id, user_id), WorkspaceRole::Owner)]),
        roles: HashMap::from([(workspace_id, vec![owner_role_row(&registry)])]),
    };
    let service = AuthorizationService::new(Arc::new(repository));

    let permissions = service.resolve_permissions(user_id, workspace_id).await;

    let expected = registry
        .all_permission_keys()
        .into_iter()
        .map(str::to_owned)
        .collect::<BTreeSet<_>>();
    assert_eq!(permissions.ok(), Some(expected));
}

#[tokio::test]
async fn membership_without_matching_role_row_resolves_empty_set() {
    let registry = PermissionRegistry::standard();
    let workspace_id = WorkspaceId::new();
    let user_id = UserId::new();
    let repository = FakeWorkspaceRoleRepository {
        members: HashMap::from([((workspace_id, user_id), WorkspaceRole::Admin)]),
        roles: HashMap::from([(workspace_id, vec![owner_role_row(&registry)])]),
    };
    let service = AuthorizationService::new(Arc::new(repository));

    let permissions = service.resolve_permissions(user_id, workspace_id).await;

    assert_eq!(permissions.ok(), Some(BTreeSet::new()));
}

#[tokio::test]
async fn non_member_resolves_empty_set() {
    let service = AuthorizationService::new(Arc::new(FakeWorkspaceRoleRepository::default()));

    let permissions = service
        .resolve_permissions(UserId::new(), WorkspaceId::new())
        .await;

    assert_eq!(permissions.ok(), Some(BTreeSet::new()));
}

#[tokio::test]
async fn resolution_reads_stored_grants_not_defaults() {
    let workspace_id = WorkspaceId::new();
    let user_id = UserId::new();
    let repository = FakeWorkspaceRoleRepository {
        members: HashMap::from([((workspace_id, user_id), WorkspaceRole::Member)]),
        roles: HashMap::from([(
            workspace_id,
            vec![role_row(
                BuiltInRole::Member,
                vec![permission_keys::CONTENT_CREATE.to_owned()],
            )],
        )]),
    };
    let service = AuthorizationService::new(Arc::new(repository));

    let permissions = service
        .resolve_permissions(user_id, workspace_id)
        .await
        .unwrap_or_default();

    assert!(permissions.contains(permission_keys::CONTENT_CREATE));
    assert!(!permissions.contains(permission_keys::BRAND_VIEW));
}

#[tokio::test]
async fn require_permission_denies_missing_grant() {
    let workspace_id = WorkspaceId::new();
    let user_id = UserId::new();
    let repository = FakeWorkspaceRoleRepository {
        members: HashMap::from([((workspace_id, user_id), WorkspaceRole::Member)]),
        roles: HashMap::from([(
            workspace_id,
            vec![role_row(
                BuiltInRole::Member,
                vec![permission_keys::BRAND_VIEW.to_owned()],
            )],
        )]),
    };
    let service = AuthorizationService::new(Arc::new(repository));

    let allowed = service
        .require_permission(user_id, workspace_id, permission_keys::BRAND_VIEW)
        .await;
    assert!(allowed.is_ok());

    let denied = service
        .require_permission(user_id, workspace_id, permission_keys::BRAND_MANAGE)
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
}
