//! Idempotent materialisation of built-in workspace roles.
//!
//! Provisioning runs against a [`RoleProvisioningStore`] bound to the caller's
//! transaction. Every write is an upsert, so reruns and concurrent runs for the
//! same workspace converge on the same rows. Edges are only ever added.

use std::sync::Arc;

use async_trait::async_trait;
use brandroom_core::{AppResult, RoleId, WorkspaceId};
use brandroom_domain::{BuiltInRole, PermissionDefinition, PermissionRegistry, PermissionSubset};
use tracing::{debug, warn};

/// Transaction-bound write port used by provisioning.
///
/// Implementations must treat a unique-constraint race as "row already
/// exists" and return the surviving row.
#[async_trait]
pub trait RoleProvisioningStore: Send {
    /// Creates the permission row if absent and refreshes its description.
    async fn upsert_permission(&mut self, definition: &PermissionDefinition) -> AppResult<()>;

    /// Creates or updates the built-in role row keyed by workspace and role key.
    async fn upsert_role(&mut self, workspace_id: WorkspaceId, role: BuiltInRole)
    -> AppResult<RoleId>;

    /// Creates the role-permission edge if absent.
    async fn grant_permission(&mut self, role_id: RoleId, permission_key: &str) -> AppResult<()>;
}

/// Materialises built-in roles and their grants for a workspace.
#[derive(Debug, Clone)]
pub struct RoleProvisioner {
    registry: Arc<PermissionRegistry>,
}

impl RoleProvisioner {
    /// Creates a provisioner over an immutable permission registry.
    #[must_use]
    pub fn new(registry: Arc<PermissionRegistry>) -> Self {
        Self { registry }
    }

    /// Ensures the three built-in roles and their grants exist for the workspace.
    ///
    /// Errors are returned as-is so the enclosing transaction rolls back.
    pub async fn ensure_default_workspace_roles<S>(
        &self,
        store: &mut S,
        workspace_id: WorkspaceId,
    ) -> AppResult<()>
    where
        S: RoleProvisioningStore + ?Sized,
    {
        for definition in self.registry.definitions() {
            store.upsert_permission(definition).await?;
        }

        for role in BuiltInRole::all() {
            let role_id = store.upsert_role(workspace_id, *role).await?;

            for permission_key in self.granted_keys(*role) {
                store.grant_permission(role_id, permission_key).await?;
            }
        }

        debug!(%workspace_id, "built-in workspace roles provisioned");
        Ok(())
    }

    fn granted_keys(&self, role: BuiltInRole) -> Vec<&str> {
        match role.permission_subset() {
            PermissionSubset::All => self.registry.all_permission_keys(),
            PermissionSubset::Named(keys) => keys
                .iter()
                .copied()
                .filter(|key| {
                    let known = self.registry.contains(key);
                    if !known {
                        warn!(
                            role = role.key(),
                            permission_key = *key,
                            "skipping grant for permission missing from registry"
                        );
                    }
                    known
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests;
