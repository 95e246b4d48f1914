use async_trait::async_trait;
use sqlx::PgConnection;

use brandroom_application::RoleProvisioningStore;
use brandroom_core::{AppError, AppResult, RoleId, WorkspaceId};
use brandroom_domain::{BuiltInRole, PermissionDefinition};

/// Provisioning store bound to an open PostgreSQL transaction.
///
/// Every insert carries an `ON CONFLICT` clause on the row's natural key,
/// so concurrent provisioning of the same workspace converges on one row
/// instead of raising a unique violation. Runs for different workspaces never
/// wait on each other for an up-to-date permission catalog.
pub struct PostgresRoleProvisioningStore<'t> {
    connection: &'t mut PgConnection,
}

impl<'t> PostgresRoleProvisioningStore<'t> {
    /// Binds the store to the connection of the enclosing transaction.
    #[must_use]
    pub fn new(connection: &'t mut PgConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl RoleProvisioningStore for PostgresRoleProvisioningStore<'_> {
    async fn upsert_permission(&mut self, definition: &PermissionDefinition) -> AppResult<()> {
        // Catalog rows are shared across workspaces: only a stale row may be
        // locked by this transaction.
        sqlx::query(
            r#"
            INSERT INTO permissions (key, description)
            VALUES ($1, $2)
            ON CONFLICT (key) DO NOTHING
            "#,
        )
        .bind(definition.key())
        .bind(definition.description())
        .execute(&mut *self.connection)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to ensure permission '{}': {error}",
                definition.key()
            ))
        })?;

        sqlx::query(
            r#"
            UPDATE permissions
            SET description = $2,
                updated_at = now()
            WHERE key = $1
              AND description IS DISTINCT FROM $2
            "#,
        )
        .bind(definition.key())
        .bind(definition.description())
        .execute(&mut *self.connection)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to refresh permission '{}': {error}",
                definition.key()
            ))
        })?;

        Ok(())
    }

    async fn upsert_role(
        &mut self,
        workspace_id: WorkspaceId,
        role: BuiltInRole,
    ) -> AppResult<RoleId> {
        let role_id = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            INSERT INTO workspace_roles (workspace_id, key, name, description, built_in, display_order)
            VALUES ($1, $2, $3, $4, true, $5)
            ON CONFLICT (workspace_id, key) DO UPDATE
            SET name = EXCLUDED.name,
                description = EXCLUDED.description,
                built_in = true,
                display_order = EXCLUDED.display_order,
                updated_at = now()
            RETURNING id
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(role.key())
        .bind(role.display_name())
        .bind(role.description())
        .bind(role.order())
        .fetch_one(&mut *self.connection)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to ensure role '{}' for workspace '{}': {error}",
                role.key(),
                workspace_id
            ))
        })?;

        Ok(RoleId::from_uuid(role_id))
    }

    async fn grant_permission(&mut self, role_id: RoleId, permission_key: &str) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO workspace_role_permissions (role_id, permission_id)
            SELECT $1, permissions.id
            FROM permissions
            WHERE permissions.key = $2
            ON CONFLICT (role_id, permission_id) DO NOTHING
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(permission_key)
        .execute(&mut *self.connection)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to grant permission '{permission_key}' to role '{role_id}': {error}"
            ))
        })?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query_scalar::<_, bool>(
                r#"
                SELECT EXISTS (SELECT 1 FROM permissions WHERE key = $1)
                "#,
            )
            .bind(permission_key)
            .fetch_one(&mut *self.connection)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to verify permission '{permission_key}': {error}"
                ))
            })?;

            if !exists {
                return Err(AppError::Internal(format!(
                    "permission '{permission_key}' must be provisioned before it is granted"
                )));
            }
        }

        Ok(())
    }
}
