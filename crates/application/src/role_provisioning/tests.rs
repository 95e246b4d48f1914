use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use brandroom_core::{AppError, AppResult, RoleId, WorkspaceId};
use brandroom_domain::{BuiltInRole, PermissionDefinition, PermissionRegistry, permission_keys};

use super::{RoleProvisioner, RoleProvisioningStore};

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredRole {
    role_id: RoleId,
    name: String,
    order: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FakeProvisioningStore {
    permissions: BTreeMap<String, String>,
    roles: BTreeMap<(WorkspaceId, String), StoredRole>,
    edges: BTreeSet<(RoleId, String)>,
    fail_on_grant: Option<String>,
}

impl FakeProvisioningStore {
    fn role_id(&self, workspace_id: WorkspaceId, role: BuiltInRole) -> Option<RoleId> {
        self.roles
            .get(&(workspace_id, role.key().to_owned()))
            .map(|stored| stored.role_id)
    }

    fn grants(&self, workspace_id: WorkspaceId, role: BuiltInRole) -> BTreeSet<String> {
        let Some(role_id) = self.role_id(workspace_id, role) else {
            return BTreeSet::new();
        };

        self.edges
            .iter()
            .filter(|(stored_role_id, _)| stored_role_id == &role_id)
            .map(|(_, key)| key.clone())
            .collect()
    }
}

#[async_trait]
impl RoleProvisioningStore for FakeProvisioningStore {
    async fn upsert_permission(&mut self, definition: &PermissionDefinition) -> AppResult<()> {
        self.permissions
            .insert(definition.key().to_owned(), definition.description().to_owned());
        Ok(())
    }

    async fn upsert_role(
        &mut self,
        workspace_id: WorkspaceId,
        role: BuiltInRole,
    ) -> AppResult<RoleId> {
        let stored = self
            .roles
            .entry((workspace_id, role.key().to_owned()))
            .or_insert_with(|| StoredRole {
                role_id: RoleId::new(),
                name: String::new(),
                order: 0,
            });
        stored.name = role.display_name().to_owned();
        stored.order = role.order();

        Ok(stored.role_id)
    }

    async fn grant_permission(&mut self, role_id: RoleId, permission_key: &str) -> AppResult<()> {
        if self.fail_on_grant.as_deref() == Some(permission_key) {
            return Err(AppError::Internal("edge insert failed".to_owned()));
        }

        if !self.permissions.contains_key(permission_key) {
            return Err(AppError::Internal(format!(
                "permission '{permission_key}' has no catalog row"
            )));
        }

        self.edges.insert((role_id, permission_key.to_owned()));
        Ok(())
    }
}

fn provisioner(registry: PermissionRegistry) -> RoleProvisioner {
    RoleProvisioner::new(Arc::new(registry))
}

fn keys(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

#[tokio::test]
async fn provisioning_creates_three_built_in_roles() {
    let provisioner = provisioner(PermissionRegistry::standard());
    let mut store = FakeProvisioningStore::default();
    let workspace_id = WorkspaceId::new();

    let result = provisioner
        .ensure_default_workspace_roles(&mut store, workspace_id)
        .await;
    assert!(result.is_ok());

    assert_eq!(store.roles.len(), 3);
    for role in BuiltInRole::all() {
        assert!(store.role_id(workspace_id, *role).is_some());
    }

    assert_eq!(
        store.grants(workspace_id, BuiltInRole::Owner),
        keys(&PermissionRegistry::standard().all_permission_keys())
    );
    assert_eq!(
        store.grants(workspace_id, BuiltInRole::Admin),
        keys(&[
            permission_keys::WORKSPACE_SETTINGS_MANAGE,
            permission_keys::BRAND_VIEW,
            permission_keys::CONTENT_CREATE,
            permission_keys::CONTENT_PUBLISH,
        ])
    );
    assert_eq!(
        store.grants(workspace_id, BuiltInRole::Member),
        keys(&[
            permission_keys::BRAND_VIEW,
            permission_keys::SOCIAL_ACCOUNT_VIEW
        ])
    );
}

#[tokio::test]
async fn provisioning_twice_matches_provisioning_once() {
    let provisioner = provisioner(PermissionRegistry::standard());
    let mut store = FakeProvisioningStore::default();
    let workspace_id = WorkspaceId::new();

    let first = provisioner
        .ensure_default_workspace_roles(&mut store, workspace_id)
        .await;
    assert!(first.is_ok());
    let after_first = store.clone();

    let second = provisioner
        .ensure_default_workspace_roles(&mut store, workspace_id)
        .await;
    assert!(second.is_ok());

    assert_eq!(store, after_first);
}

#[tokio::test]
async fn new_registry_key_is_granted_to_owner_without_revoking_edges() {
    let workspace_id = WorkspaceId::new();
    let mut store = FakeProvisioningStore::default();

    let initial = provisioner(PermissionRegistry::standard());
    assert!(
        initial
            .ensure_default_workspace_roles(&mut store, workspace_id)
            .await
            .is_ok()
    );
    let admin_before = store.grants(workspace_id, BuiltInRole::Admin);
    let member_before = store.grants(workspace_id, BuiltInRole::Member);

    let mut definitions = PermissionRegistry::standard().definitions().to_vec();
    definitions.push(PermissionDefinition::new(
        "analytics.view",
        "View analytics dashboards",
    ));
    let extended = PermissionRegistry::new(definitions)
        .unwrap_or_else(|error| panic!("extended registry should be valid: {error}"));
    assert!(
        provisioner(extended)
            .ensure_default_workspace_roles(&mut store, workspace_id)
            .await
            .is_ok()
    );

    assert!(
        store
            .grants(workspace_id, BuiltInRole::Owner)
            .contains("analytics.view")
    );
    assert_eq!(store.grants(workspace_id, BuiltInRole::Admin), admin_before);
    assert_eq!(store.grants(workspace_id, BuiltInRole::Member), member_before);
}

#[tokio::test]
async fn shrinking_registry_never_removes_existing_edges() {
    let workspace_id = WorkspaceId::new();
    let mut store = FakeProvisioningStore::default();

    assert!(
        provisioner(PermissionRegistry::standard())
            .ensure_default_workspace_roles(&mut store, workspace_id)
            .await
            .is_ok()
    );
    let owner_before = store.grants(workspace_id, BuiltInRole::Owner);

    let reduced = PermissionRegistry::new(vec![PermissionDefinition::new(
        permission_keys::BRAND_VIEW,
        "View brands",
    )])
    .unwrap_or_else(|error| panic!("reduced registry should be valid: {error}"));
    assert!(
        provisioner(reduced)
            .ensure_default_workspace_roles(&mut store, workspace_id)
            .await
            .is_ok()
    );

    assert_eq!(store.grants(workspace_id, BuiltInRole::Owner), owner_before);
}

#[tokio::test]
async fn store_failure_is_propagated() {
    let provisioner = provisioner(PermissionRegistry::standard());
    let mut store = FakeProvisioningStore {
        fail_on_grant: Some(permission_keys::CONTENT_PUBLISH.to_owned()),
        ..FakeProvisioningStore::default()
    };

    let result = provisioner
        .ensure_default_workspace_roles(&mut store, WorkspaceId::new())
        .await;

    assert!(matches!(result, Err(AppError::Internal(_))));
}

#[tokio::test]
async fn workspaces_are_provisioned_independently() {
    let provisioner = provisioner(PermissionRegistry::standard());
    let mut store = FakeProvisioningStore::default();
    let first = WorkspaceId::new();
    let second = WorkspaceId::new();

    assert!(
        provisioner
            .ensure_default_workspace_roles(&mut store, first)
            .await
            .is_ok()
    );
    assert!(
        provisioner
            .ensure_default_workspace_roles(&mut store, second)
            .await
            .is_ok()
    );

    assert_eq!(store.roles.len(), 6);
    assert_ne!(
        store.role_id(first, BuiltInRole::Owner),
        store.role_id(second, BuiltInRole::Owner)
    );
}
