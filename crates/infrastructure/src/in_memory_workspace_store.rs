use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use brandroom_application::{
    BrandRepository, BrandSummary, RoleProvisioner, RoleProvisioningStore, SocialAccountSummary,
    SubscriptionRepository, UsageCounter, WorkspaceMember, WorkspaceRepository,
    WorkspaceRoleDefinition, WorkspaceRoleRepository, WorkspaceSummary,
};
use brandroom_core::{AppError, AppResult, BrandId, RoleId, UserId, WorkspaceId};
use brandroom_domain::{BuiltInRole, PermissionDefinition, Plan, Subscription, WorkspaceRole};

#[derive(Debug, Clone)]
struct StoredRole {
    role_id: RoleId,
    name: String,
    description: String,
    built_in: bool,
    order: i32,
}

#[derive(Debug, Clone, Default)]
struct WorkspaceState {
    workspaces: HashMap<WorkspaceId, String>,
    permissions: BTreeMap<String, String>,
    roles: HashMap<(WorkspaceId, String), StoredRole>,
    grants: BTreeSet<(RoleId, String)>,
    members: HashMap<(WorkspaceId, UserId), WorkspaceRole>,
    subscriptions: HashMap<WorkspaceId, Subscription>,
    brands: HashMap<BrandId, BrandSummary>,
    social_accounts: Vec<SocialAccountSummary>,
    scheduled_posts: HashMap<WorkspaceId, u64>,
}

impl WorkspaceState {
    fn ensure_workspace(&self, workspace_id: WorkspaceId) -> AppResult<()> {
        if self.workspaces.contains_key(&workspace_id) {
            return Ok(());
        }

        Err(AppError::NotFound(format!(
            "workspace '{workspace_id}' not found"
        )))
    }

    fn brand_in_workspace(
        &self,
        workspace_id: WorkspaceId,
        brand_id: BrandId,
    ) -> AppResult<&BrandSummary> {
        self.brands
            .get(&brand_id)
            .filter(|brand| brand.workspace_id == workspace_id)
            .ok_or_else(|| {
                AppError::BrandNotFound(format!(
                    "brand '{brand_id}' does not exist in workspace '{workspace_id}'"
                ))
            })
    }
}

/// Provisioning writes staged against a copy of the store state.
struct StagedProvisioning<'a> {
    state: &'a mut WorkspaceState,
}

#[async_trait]
impl RoleProvisioningStore for StagedProvisioning<'_> {
    async fn upsert_permission(&mut self, definition: &PermissionDefinition) -> AppResult<()> {
        self.state.permissions.insert(
            definition.key().to_owned(),
            definition.description().to_owned(),
        );
        Ok(())
    }

    async fn upsert_role(
        &mut self,
        workspace_id: WorkspaceId,
        role: BuiltInRole,
    ) -> AppResult<RoleId> {
        let stored = self
            .state
            .roles
            .entry((workspace_id, role.key().to_owned()))
            .or_insert_with(|| StoredRole {
                role_id: RoleId::new(),
                name: String::new(),
                description: String::new(),
                built_in: true,
                order: 0,
            });
        stored.name = role.display_name().to_owned();
        stored.description = role.description().to_owned();
        stored.built_in = true;
        stored.order = role.order();

        Ok(stored.role_id)
    }

    async fn grant_permission(&mut self, role_id: RoleId, permission_key: &str) -> AppResult<()> {
        if !self.state.permissions.contains_key(permission_key) {
            return Err(AppError::Internal(format!(
                "permission '{permission_key}' must be provisioned before it is granted"
            )));
        }

        self.state
            .grants
            .insert((role_id, permission_key.to_owned()));
        Ok(())
    }
}

/// In-memory implementation of every workspace port.
///
/// Multi-row writes are staged on a copy of the state and swapped in only on
/// success, so a failed provisioning run leaves nothing behind.
#[derive(Debug)]
pub struct InMemoryWorkspaceStore {
    provisioner: RoleProvisioner,
    state: RwLock<WorkspaceState>,
}

impl InMemoryWorkspaceStore {
    /// Creates an empty store provisioning with the given provisioner.
    #[must_use]
    pub fn new(provisioner: RoleProvisioner) -> Self {
        Self {
            provisioner,
            state: RwLock::new(WorkspaceState::default()),
        }
    }

    /// Replaces the subscription row of a workspace, as the billing integration would.
    pub async fn save_subscription(&self, subscription: Subscription) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.ensure_workspace(subscription.workspace_id)?;
        state
            .subscriptions
            .insert(subscription.workspace_id, subscription);
        Ok(())
    }

    /// Deletes the subscription row of a workspace.
    pub async fn delete_subscription(&self, workspace_id: WorkspaceId) {
        self.state.write().await.subscriptions.remove(&workspace_id);
    }

    /// Records a scheduled post, as the publishing collaborator would.
    pub async fn schedule_post(&self, workspace_id: WorkspaceId) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.ensure_workspace(workspace_id)?;
        *state.scheduled_posts.entry(workspace_id).or_default() += 1;
        Ok(())
    }

    /// Deletes a stored role row and its edges.
    pub async fn delete_role(&self, workspace_id: WorkspaceId, role_key: &str) {
        let mut state = self.state.write().await;
        if let Some(role) = state.roles.remove(&(workspace_id, role_key.to_owned())) {
            state
                .grants
                .retain(|(role_id, _)| *role_id != role.role_id);
        }
    }

    /// Reprovisions a workspace with another provisioner, e.g. after the
    /// registry gained keys.
    pub async fn reprovision_with(
        &self,
        provisioner: &RoleProvisioner,
        workspace_id: WorkspaceId,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.ensure_workspace(workspace_id)?;

        let mut staged = state.clone();
        provisioner
            .ensure_default_workspace_roles(
                &mut StagedProvisioning {
                    state: &mut staged,
                },
                workspace_id,
            )
            .await?;

        *state = staged;
        Ok(())
    }
}

#[async_trait]
impl WorkspaceRepository for InMemoryWorkspaceStore {
    async fn create_workspace(&self, owner: UserId, name: &str) -> AppResult<WorkspaceSummary> {
        let workspace_id = WorkspaceId::new();
        let mut state = self.state.write().await;

        let mut staged = state.clone();
        staged.workspaces.insert(workspace_id, name.to_owned());
        staged
            .subscriptions
            .insert(workspace_id, Subscription::free(workspace_id));
        staged
            .members
            .insert((workspace_id, owner), WorkspaceRole::Owner);
        self.provisioner
            .ensure_default_workspace_roles(
                &mut StagedProvisioning {
                    state: &mut staged,
                },
                workspace_id,
            )
            .await?;

        *state = staged;

        Ok(WorkspaceSummary {
            workspace_id,
            name: name.to_owned(),
            plan: Plan::Free,
        })
    }

    async fn reprovision_roles(&self, workspace_id: WorkspaceId) -> AppResult<()> {
        self.reprovision_with(&self.provisioner, workspace_id).await
    }

    async fn add_member(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
        role: WorkspaceRole,
    ) -> AppResult<WorkspaceMember> {
        let mut state = self.state.write().await;
        state.ensure_workspace(workspace_id)?;

        if state.members.contains_key(&(workspace_id, user_id)) {
            return Err(AppError::Conflict(format!(
                "user '{user_id}' is already a member of workspace '{workspace_id}'"
            )));
        }

        state.members.insert((workspace_id, user_id), role);
        Ok(WorkspaceMember {
            workspace_id,
            user_id,
            role,
        })
    }

    async fn change_member_role(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
        role: WorkspaceRole,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        let stored = state
            .members
            .get_mut(&(workspace_id, user_id))
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "user '{user_id}' is not a member of workspace '{workspace_id}'"
                ))
            })?;

        *stored = role;
        Ok(())
    }

    async fn remove_member(&self, workspace_id: WorkspaceId, user_id: UserId) -> AppResult<()> {
        self.state
            .write()
            .await
            .members
            .remove(&(workspace_id, user_id))
            .map(|_| ())
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "user '{user_id}' is not a member of workspace '{workspace_id}'"
                ))
            })
    }
}

#[async_trait]
impl WorkspaceRoleRepository for InMemoryWorkspaceStore {
    async fn find_member_role(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> AppResult<Option<WorkspaceRole>> {
        Ok(self
            .state
            .read()
            .await
            .members
            .get(&(workspace_id, user_id))
            .copied())
    }

    async fn list_workspace_roles(
        &self,
        workspace_id: WorkspaceId,
    ) -> AppResult<Vec<WorkspaceRoleDefinition>> {
        let state = self.state.read().await;

        let mut roles: Vec<WorkspaceRoleDefinition> = state
            .roles
            .iter()
            .filter(|((stored_workspace_id, _), _)| *stored_workspace_id == workspace_id)
            .map(|((_, key), role)| WorkspaceRoleDefinition {
                role_id: role.role_id,
                key: key.clone(),
                name: role.name.clone(),
                description: role.description.clone(),
                built_in: role.built_in,
                order: role.order,
                permission_keys: state
                    .grants
                    .iter()
                    .filter(|(role_id, _)| *role_id == role.role_id)
                    .map(|(_, permission_key)| permission_key.clone())
                    .collect(),
            })
            .collect();
        roles.sort_by(|left, right| {
            left.order
                .cmp(&right.order)
                .then_with(|| left.key.cmp(&right.key))
        });

        Ok(roles)
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryWorkspaceStore {
    async fn find_subscription(
        &self,
        workspace_id: WorkspaceId,
    ) -> AppResult<Option<Subscription>> {
        Ok(self
            .state
            .read()
            .await
            .subscriptions
            .get(&workspace_id)
            .cloned())
    }
}

#[async_trait]
impl UsageCounter for InMemoryWorkspaceStore {
    async fn count_current_usage(
        &self,
        resource_key: &str,
        workspace_id: WorkspaceId,
        brand_id: Option<BrandId>,
    ) -> AppResult<u64> {
        let state = self.state.read().await;

        let count = match (resource_key, brand_id) {
            ("brand", _) => state
                .brands
                .values()
                .filter(|brand| brand.workspace_id == workspace_id)
                .count(),
            ("socialAccount", Some(brand_id)) => {
                state.brand_in_workspace(workspace_id, brand_id)?;
                state
                    .social_accounts
                    .iter()
                    .filter(|account| account.brand_id == brand_id)
                    .count()
            }
            ("socialAccount", None) => {
                let mut per_brand: HashMap<BrandId, usize> = HashMap::new();
                for account in &state.social_accounts {
                    if state
                        .brands
                        .get(&account.brand_id)
                        .is_some_and(|brand| brand.workspace_id == workspace_id)
                    {
                        *per_brand.entry(account.brand_id).or_default() += 1;
                    }
                }
                per_brand.into_values().max().unwrap_or_default()
            }
            ("member", _) => state
                .members
                .keys()
                .filter(|(stored_workspace_id, _)| *stored_workspace_id == workspace_id)
                .count(),
            ("post", _) => {
                return Ok(state
                    .scheduled_posts
                    .get(&workspace_id)
                    .copied()
                    .unwrap_or_default());
            }
            _ => {
                return Err(AppError::UnsupportedLimit(format!(
                    "no usage source for resource '{resource_key}'"
                )));
            }
        };

        u64::try_from(count).map_err(|error| {
            AppError::Internal(format!("invalid '{resource_key}' usage count: {error}"))
        })
    }
}

#[async_trait]
impl BrandRepository for InMemoryWorkspaceStore {
    async fn create_brand(
        &self,
        workspace_id: WorkspaceId,
        name: &str,
    ) -> AppResult<BrandSummary> {
        let mut state = self.state.write().await;
        state.ensure_workspace(workspace_id)?;

        let brand = BrandSummary {
            brand_id: BrandId::new(),
            workspace_id,
            name: name.to_owned(),
        };
        state.brands.insert(brand.brand_id, brand.clone());

        Ok(brand)
    }

    async fn connect_social_account(
        &self,
        workspace_id: WorkspaceId,
        brand_id: BrandId,
        handle: &str,
    ) -> AppResult<SocialAccountSummary> {
        let mut state = self.state.write().await;
        state.brand_in_workspace(workspace_id, brand_id)?;

        if state
            .social_accounts
            .iter()
            .any(|account| account.brand_id == brand_id && account.handle == handle)
        {
            return Err(AppError::Conflict(format!(
                "account '{handle}' is already connected to brand '{brand_id}'"
            )));
        }

        let account = SocialAccountSummary {
            social_account_id: uuid::Uuid::new_v4().to_string(),
            brand_id,
            handle: handle.to_owned(),
        };
        state.social_accounts.push(account.clone());

        Ok(account)
    }
}
