use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use brandroom_application::{
    RoleProvisioner, WorkspaceMember, WorkspaceRepository, WorkspaceSummary,
};
use brandroom_core::{AppError, AppResult, UserId, WorkspaceId};
use brandroom_domain::{Plan, Subscription, WorkspaceRole};

use crate::PostgresRoleProvisioningStore;

/// PostgreSQL-backed repository for workspace lifecycle and membership.
#[derive(Clone)]
pub struct PostgresWorkspaceRepository {
    pool: PgPool,
    provisioner: RoleProvisioner,
}

impl PostgresWorkspaceRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool, provisioner: RoleProvisioner) -> Self {
        Self { pool, provisioner }
    }
}

#[async_trait]
impl WorkspaceRepository for PostgresWorkspaceRepository {
    async fn create_workspace(&self, owner: UserId, name: &str) -> AppResult<WorkspaceSummary> {
        let workspace_id = WorkspaceId::new();
        let subscription = Subscription::free(workspace_id);

        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query(
            r#"
            INSERT INTO workspaces (id, name)
            VALUES ($1, $2)
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(name)
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create workspace: {error}")))?;

        sqlx::query(
            r#"
            INSERT INTO subscriptions (workspace_id, plan, status, period_start, period_end, cancel_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(subscription.plan.as_str())
        .bind(subscription.status.as_str())
        .bind(subscription.period_start)
        .bind(subscription.period_end)
        .bind(subscription.cancel_at)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to create workspace subscription: {error}"))
        })?;

        sqlx::query(
            r#"
            INSERT INTO workspace_members (workspace_id, user_id, role)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(owner.as_uuid())
        .bind(WorkspaceRole::Owner.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to create owner membership: {error}"))
        })?;

        let mut store = PostgresRoleProvisioningStore::new(&mut *transaction);
        self.provisioner
            .ensure_default_workspace_roles(&mut store, workspace_id)
            .await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        info!(%workspace_id, owner = %owner, "workspace created");

        Ok(WorkspaceSummary {
            workspace_id,
            name: name.to_owned(),
            plan: Plan::Free,
        })
    }

    async fn reprovision_roles(&self, workspace_id: WorkspaceId) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let workspace_exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM workspaces WHERE id = $1)
            "#,
        )
        .bind(workspace_id.as_uuid())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to resolve workspace '{workspace_id}': {error}"
            ))
        })?;

        if !workspace_exists {
            return Err(AppError::NotFound(format!(
                "workspace '{workspace_id}' not found"
            )));
        }

        let mut store = PostgresRoleProvisioningStore::new(&mut *transaction);
        self.provisioner
            .ensure_default_workspace_roles(&mut store, workspace_id)
            .await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }

    async fn add_member(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
        role: WorkspaceRole,
    ) -> AppResult<WorkspaceMember> {
        sqlx::query(
            r#"
            INSERT INTO workspace_members (workspace_id, user_id, role)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| map_membership_error(error, workspace_id, user_id))?;

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
        let result = sqlx::query(
            r#"
            UPDATE workspace_members
            SET role = $3,
                updated_at = now()
            WHERE workspace_id = $1
              AND user_id = $2
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to change member role: {error}"))
        })?;

        if result.rows_affected() == 0 {
            return Err(member_not_found(workspace_id, user_id));
        }

        Ok(())
    }

    async fn remove_member(&self, workspace_id: WorkspaceId, user_id: UserId) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM workspace_members
            WHERE workspace_id = $1
              AND user_id = $2
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove member: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(member_not_found(workspace_id, user_id));
        }

        Ok(())
    }
}

fn member_not_found(workspace_id: WorkspaceId, user_id: UserId) -> AppError {
    AppError::NotFound(format!(
        "user '{user_id}' is not a member of workspace '{workspace_id}'"
    ))
}

fn map_membership_error(
    error: sqlx::Error,
    workspace_id: WorkspaceId,
    user_id: UserId,
) -> AppError {
    if let sqlx::Error::Database(database_error) = &error {
        match database_error.code().as_deref() {
            Some("23505") => {
                return AppError::Conflict(format!(
                    "user '{user_id}' is already a member of workspace '{workspace_id}'"
                ));
            }
            Some("23503") => {
                return AppError::NotFound(format!("workspace '{workspace_id}' not found"));
            }
            _ => {}
        }
    }

    AppError::Internal(format!("failed to add member: {error}"))
}

#[cfg(test)]
mod tests;
