use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use brandroom_application::{WorkspaceRoleDefinition, WorkspaceRoleRepository};
use brandroom_core::{AppError, AppResult, RoleId, UserId, WorkspaceId};
use brandroom_domain::WorkspaceRole;

/// PostgreSQL-backed repository for membership and role lookups.
#[derive(Clone)]
pub struct PostgresWorkspaceRoleRepository {
    pool: PgPool,
}

impl PostgresWorkspaceRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    role_id: uuid::Uuid,
    role_key: String,
    role_name: String,
    role_description: String,
    built_in: bool,
    display_order: i32,
    permission_key: Option<String>,
}

#[async_trait]
impl WorkspaceRoleRepository for PostgresWorkspaceRoleRepository {
    async fn find_member_role(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> AppResult<Option<WorkspaceRole>> {
        let stored_role = sqlx::query_scalar::<_, String>(
            r#"
            SELECT role
            FROM workspace_members
            WHERE workspace_id = $1
              AND user_id = $2
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to resolve workspace membership: {error}"))
        })?;

        stored_role
            .map(|value| {
                WorkspaceRole::from_str(value.as_str()).map_err(|error| {
                    AppError::Internal(format!(
                        "invalid stored role '{value}' for workspace '{workspace_id}': {error}"
                    ))
                })
            })
            .transpose()
    }

    async fn list_workspace_roles(
        &self,
        workspace_id: WorkspaceId,
    ) -> AppResult<Vec<WorkspaceRoleDefinition>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                roles.id AS role_id,
                roles.key AS role_key,
                roles.name AS role_name,
                roles.description AS role_description,
                roles.built_in,
                roles.display_order,
                permissions.key AS permission_key
            FROM workspace_roles AS roles
            LEFT JOIN workspace_role_permissions AS edges
                ON edges.role_id = roles.id
            LEFT JOIN permissions
                ON permissions.id = edges.permission_id
            WHERE roles.workspace_id = $1
            ORDER BY roles.display_order, roles.key, permissions.key
            "#,
        )
        .bind(workspace_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list roles for workspace '{workspace_id}': {error}"
            ))
        })?;

        Ok(aggregate_roles(rows))
    }
}

fn aggregate_roles(rows: Vec<RoleRow>) -> Vec<WorkspaceRoleDefinition> {
    let mut by_id: HashMap<uuid::Uuid, WorkspaceRoleDefinition> = HashMap::new();

    for row in rows {
        let role = by_id
            .entry(row.role_id)
            .or_insert_with(|| WorkspaceRoleDefinition {
                role_id: RoleId::from_uuid(row.role_id),
                key: row.role_key.clone(),
                name: row.role_name.clone(),
                description: row.role_description.clone(),
                built_in: row.built_in,
                order: row.display_order,
                permission_keys: Vec::new(),
            });

        if let Some(permission_key) = row.permission_key {
            role.permission_keys.push(permission_key);
        }
    }

    let mut roles = by_id.into_values().collect::<Vec<_>>();
    roles.sort_by(|left, right| {
        left.order
            .cmp(&right.order)
            .then_with(|| left.key.cmp(&right.key))
    });
    roles
}
