use async_trait::async_trait;
use sqlx::PgPool;

use brandroom_application::UsageCounter;
use brandroom_core::{AppError, AppResult, BrandId, WorkspaceId};

/// PostgreSQL-backed usage counter.
///
/// Counts read committed state at call time; there is no cache.
#[derive(Clone)]
pub struct PostgresUsageCounter {
    pool: PgPool,
}

impl PostgresUsageCounter {
    /// Creates a counter with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_brand_in_workspace(
        &self,
        workspace_id: WorkspaceId,
        brand_id: BrandId,
    ) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM brands
                WHERE id = $1
                  AND workspace_id = $2
            )
            "#,
        )
        .bind(brand_id.as_uuid())
        .bind(workspace_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to resolve brand '{brand_id}': {error}"))
        })?;

        if !exists {
            return Err(AppError::BrandNotFound(format!(
                "brand '{brand_id}' does not exist in workspace '{workspace_id}'"
            )));
        }

        Ok(())
    }

    async fn count(
        &self,
        resource_key: &str,
        query: &str,
        scope_id: uuid::Uuid,
    ) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(query)
            .bind(scope_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to count '{resource_key}' usage: {error}"))
            })?;

        u64::try_from(count).map_err(|error| {
            AppError::Internal(format!("invalid '{resource_key}' usage count {count}: {error}"))
        })
    }
}

#[async_trait]
impl UsageCounter for PostgresUsageCounter {
    async fn count_current_usage(
        &self,
        resource_key: &str,
        workspace_id: WorkspaceId,
        brand_id: Option<BrandId>,
    ) -> AppResult<u64> {
        match (resource_key, brand_id) {
            ("brand", _) => {
                self.count(
                    resource_key,
                    r#"
                    SELECT COUNT(*)
                    FROM brands
                    WHERE workspace_id = $1
                    "#,
                    workspace_id.as_uuid(),
                )
                .await
            }
            ("socialAccount", Some(brand_id)) => {
                self.ensure_brand_in_workspace(workspace_id, brand_id)
                    .await?;
                self.count(
                    resource_key,
                    r#"
                    SELECT COUNT(*)
                    FROM social_accounts
                    WHERE brand_id = $1
                    "#,
                    brand_id.as_uuid(),
                )
                .await
            }
            ("socialAccount", None) => {
                self.count(
                    resource_key,
                    r#"
                    SELECT COALESCE(MAX(account_count), 0)
                    FROM (
                        SELECT COUNT(*) AS account_count
                        FROM social_accounts
                        WHERE workspace_id = $1
                        GROUP BY brand_id
                    ) AS per_brand
                    "#,
                    workspace_id.as_uuid(),
                )
                .await
            }
            ("member", _) => {
                self.count(
                    resource_key,
                    r#"
                    SELECT COUNT(*)
                    FROM workspace_members
                    WHERE workspace_id = $1
                    "#,
                    workspace_id.as_uuid(),
                )
                .await
            }
            ("post", _) => {
                self.count(
                    resource_key,
                    r#"
                    SELECT COUNT(*)
                    FROM posts
                    WHERE workspace_id = $1
                      AND status = 'scheduled'
                    "#,
                    workspace_id.as_uuid(),
                )
                .await
            }
            _ => Err(AppError::UnsupportedLimit(format!(
                "no usage source for resource '{resource_key}'"
            ))),
        }
    }
}
