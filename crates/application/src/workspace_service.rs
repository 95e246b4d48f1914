use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use brandroom_core::{
    AppError, AppResult, BrandId, NonEmptyString, UserId, UserIdentity, WorkspaceId,
};
use brandroom_domain::{Plan, WorkspaceRole, permission_keys};

use crate::AuthorizationService;

/// Workspace projection returned after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceSummary {
    /// Stable workspace identifier.
    pub workspace_id: WorkspaceId,
    /// Display name.
    pub name: String,
    /// Plan of the subscription created with the workspace.
    pub plan: Plan,
}

/// Membership row of a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceMember {
    /// Workspace the member belongs to.
    pub workspace_id: WorkspaceId,
    /// Member user.
    pub user_id: UserId,
    /// Membership role.
    pub role: WorkspaceRole,
}

/// Brand projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandSummary {
    /// Stable brand identifier.
    pub brand_id: BrandId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Display name.
    pub name: String,
}

/// Connected social account projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialAccountSummary {
    /// Stable account identifier.
    pub social_account_id: String,
    /// Brand the account publishes for.
    pub brand_id: BrandId,
    /// Network handle.
    pub handle: String,
}

/// Repository port for workspace lifecycle and membership writes.
#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    /// Creates the workspace, its free subscription, the owner membership and
    /// the built-in roles as one unit.
    async fn create_workspace(&self, owner: UserId, name: &str) -> AppResult<WorkspaceSummary>;

    /// Re-materialises built-in roles for an existing workspace.
    async fn reprovision_roles(&self, workspace_id: WorkspaceId) -> AppResult<()>;

    /// Adds a member; fails with `Conflict` when the user already belongs.
    async fn add_member(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
        role: WorkspaceRole,
    ) -> AppResult<WorkspaceMember>;

    /// Changes the role of an existing member.
    async fn change_member_role(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
        role: WorkspaceRole,
    ) -> AppResult<()>;

    /// Removes a member.
    async fn remove_member(&self, workspace_id: WorkspaceId, user_id: UserId) -> AppResult<()>;
}

/// Repository port for the brand collaborator tables.
#[async_trait]
pub trait BrandRepository: Send + Sync {
    /// Creates a brand in the workspace.
    async fn create_brand(&self, workspace_id: WorkspaceId, name: &str)
    -> AppResult<BrandSummary>;

    /// Connects a social account to a brand of the workspace.
    async fn connect_social_account(
        &self,
        workspace_id: WorkspaceId,
        brand_id: BrandId,
        handle: &str,
    ) -> AppResult<SocialAccountSummary>;
}

/// Application service for workspace administration.
#[derive(Clone)]
pub struct WorkspaceService {
    authorization_service: AuthorizationService,
    workspace_repository: Arc<dyn WorkspaceRepository>,
    brand_repository: Arc<dyn BrandRepository>,
}

impl WorkspaceService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        workspace_repository: Arc<dyn WorkspaceRepository>,
        brand_repository: Arc<dyn BrandRepository>,
    ) -> Self {
        Self {
            authorization_service,
            workspace_repository,
            brand_repository,
        }
    }

    /// Creates a workspace owned by the actor.
    pub async fn create_workspace(
        &self,
        actor: &UserIdentity,
        name: &str,
    ) -> AppResult<WorkspaceSummary> {
        let name = NonEmptyString::new(name.trim())?;
        self.workspace_repository
            .create_workspace(actor.user_id(), name.as_str())
            .await
    }

    /// Returns the actor's effective permissions in the workspace.
    pub async fn permissions(
        &self,
        actor: &UserIdentity,
        workspace_id: WorkspaceId,
    ) -> AppResult<BTreeSet<String>> {
        self.authorization_service
            .resolve_permissions(actor.user_id(), workspace_id)
            .await
    }

    /// Reruns built-in role provisioning.
    pub async fn reprovision_roles(
        &self,
        actor: &UserIdentity,
        workspace_id: WorkspaceId,
    ) -> AppResult<()> {
        self.authorization_service
            .require_permission(
                actor.user_id(),
                workspace_id,
                permission_keys::WORKSPACE_SETTINGS_MANAGE,
            )
            .await?;

        self.workspace_repository
            .reprovision_roles(workspace_id)
            .await
    }

    /// Adds a member with the given role.
    pub async fn add_member(
        &self,
        actor: &UserIdentity,
        workspace_id: WorkspaceId,
        user_id: UserId,
        role: WorkspaceRole,
    ) -> AppResult<WorkspaceMember> {
        self.require_member_manager(actor, workspace_id).await?;
        self.ensure_not_granting_ownership(role)?;

        self.workspace_repository
            .add_member(workspace_id, user_id, role)
            .await
    }

    /// Changes the role of a member.
    pub async fn change_member_role(
        &self,
        actor: &UserIdentity,
        workspace_id: WorkspaceId,
        user_id: UserId,
        role: WorkspaceRole,
    ) -> AppResult<()> {
        self.require_member_manager(actor, workspace_id).await?;
        self.ensure_not_granting_ownership(role)?;
        self.ensure_not_self(actor, user_id)?;

        self.workspace_repository
            .change_member_role(workspace_id, user_id, role)
            .await
    }

    /// Removes a member.
    pub async fn remove_member(
        &self,
        actor: &UserIdentity,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> AppResult<()> {
        self.require_member_manager(actor, workspace_id).await?;
        self.ensure_not_self(actor, user_id)?;

        self.workspace_repository
            .remove_member(workspace_id, user_id)
            .await
    }

    /// Creates a brand.
    pub async fn create_brand(
        &self,
        actor: &UserIdentity,
        workspace_id: WorkspaceId,
        name: &str,
    ) -> AppResult<BrandSummary> {
        self.authorization_service
            .require_permission(actor.user_id(), workspace_id, permission_keys::BRAND_MANAGE)
            .await?;

        let name = NonEmptyString::new(name.trim())?;
        self.brand_repository
            .create_brand(workspace_id, name.as_str())
            .await
    }

    /// Connects a social account to a brand.
    pub async fn connect_social_account(
        &self,
        actor: &UserIdentity,
        workspace_id: WorkspaceId,
        brand_id: BrandId,
        handle: &str,
    ) -> AppResult<SocialAccountSummary> {
        self.authorization_service
            .require_permission(
                actor.user_id(),
                workspace_id,
                permission_keys::SOCIAL_ACCOUNT_MANAGE,
            )
            .await?;

        let handle = NonEmptyString::new(handle.trim())?;
        self.brand_repository
            .connect_social_account(workspace_id, brand_id, handle.as_str())
            .await
    }

    async fn require_member_manager(
        &self,
        actor: &UserIdentity,
        workspace_id: WorkspaceId,
    ) -> AppResult<()> {
        self.authorization_service
            .require_permission(
                actor.user_id(),
                workspace_id,
                permission_keys::WORKSPACE_MEMBER_MANAGE,
            )
            .await
    }

    fn ensure_not_granting_ownership(&self, role: WorkspaceRole) -> AppResult<()> {
        if role == WorkspaceRole::Owner {
            return Err(AppError::Validation(
                "ownership cannot be granted through membership management".to_owned(),
            ));
        }

        Ok(())
    }

    fn ensure_not_self(&self, actor: &UserIdentity, user_id: UserId) -> AppResult<()> {
        if actor.user_id() == user_id {
            return Err(AppError::Validation(
                "members cannot change their own membership".to_owned(),
            ));
        }

        Ok(())
    }
}
