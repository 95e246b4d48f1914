use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use brandroom_core::{AppError, AppResult, RoleId, UserId, WorkspaceId};
use brandroom_domain::WorkspaceRole;
use tracing::debug;

/// Stored workspace role together with its granted permission keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceRoleDefinition {
    /// Stable role identifier.
    pub role_id: RoleId,
    /// Unique role key in workspace scope, e.g. `workspace-owner`.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Human-readable summary of the role.
    pub description: String,
    /// Indicates a role materialised by provisioning.
    pub built_in: bool,
    /// Display order.
    pub order: i32,
    /// Granted permission keys.
    pub permission_keys: Vec<String>,
}

/// Repository port for membership and role lookups.
#[async_trait]
pub trait WorkspaceRoleRepository: Send + Sync {
    /// Returns the membership role of a user, if the user belongs to the workspace.
    async fn find_member_role(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> AppResult<Option<WorkspaceRole>>;

    /// Lists every role row of the workspace with its permission edges.
    async fn list_workspace_roles(
        &self,
        workspace_id: WorkspaceId,
    ) -> AppResult<Vec<WorkspaceRoleDefinition>>;
}

/// Application service resolving effective workspace permissions.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn WorkspaceRoleRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn WorkspaceRoleRepository>) -> Self {
        Self { repository }
    }

    /// Returns the effective permission set of a user in a workspace.
    ///
    /// The membership role is matched against stored role rows by key only.
    /// A missing membership or a missing role row yields an empty set.
    pub async fn resolve_permissions(
        &self,
        user_id: UserId,
        workspace_id: WorkspaceId,
    ) -> AppResult<BTreeSet<String>> {
        let Some(member_role) = self
            .repository
            .find_member_role(workspace_id, user_id)
            .await?
        else {
            debug!(%workspace_id, %user_id, "user is not a workspace member");
            return Ok(BTreeSet::new());
        };

        let role_key = member_role.role_key();
        let roles = self.repository.list_workspace_roles(workspace_id).await?;

        let Some(role) = roles.into_iter().find(|role| role.key == role_key) else {
            debug!(
                %workspace_id,
                %user_id,
                role_key = role_key.as_str(),
                "no role row matches membership role"
            );
            return Ok(BTreeSet::new());
        };

        Ok(role.permission_keys.into_iter().collect())
    }

    /// Ensures a user holds the permission in the workspace.
    pub async fn require_permission(
        &self,
        user_id: UserId,
        workspace_id: WorkspaceId,
        permission_key: &str,
    ) -> AppResult<()> {
        if self
            .has_permission(user_id, workspace_id, permission_key)
            .await?
        {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{user_id}' is missing permission '{permission_key}' in workspace '{workspace_id}'"
        )))
    }

    /// Returns whether the user currently holds the permission.
    pub async fn has_permission(
        &self,
        user_id: UserId,
        workspace_id: WorkspaceId,
        permission_key: &str,
    ) -> AppResult<bool> {
        Ok(self
            .resolve_permissions(user_id, workspace_id)
            .await?
            .contains(permission_key))
    }
}

#[cfg(test)]
mod tests;
