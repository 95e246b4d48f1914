use async_trait::async_trait;
use sqlx::PgPool;

use brandroom_application::{BrandRepository, BrandSummary, SocialAccountSummary};
use brandroom_core::{AppError, AppResult, BrandId, WorkspaceId};

/// PostgreSQL-backed repository for brands and connected accounts.
#[derive(Clone)]
pub struct PostgresBrandRepository {
    pool: PgPool,
}

impl PostgresBrandRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BrandRepository for PostgresBrandRepository {
    async fn create_brand(
        &self,
        workspace_id: WorkspaceId,
        name: &str,
    ) -> AppResult<BrandSummary> {
        let brand_id = BrandId::new();

        sqlx::query(
            r#"
            INSERT INTO brands (id, workspace_id, name)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(brand_id.as_uuid())
        .bind(workspace_id.as_uuid())
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if is_foreign_key_violation(&error) {
                return AppError::NotFound(format!("workspace '{workspace_id}' not found"));
            }
            AppError::Internal(format!("failed to create brand: {error}"))
        })?;

        Ok(BrandSummary {
            brand_id,
            workspace_id,
            name: name.to_owned(),
        })
    }

    async fn connect_social_account(
        &self,
        workspace_id: WorkspaceId,
        brand_id: BrandId,
        handle: &str,
    ) -> AppResult<SocialAccountSummary> {
        let social_account_id = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            INSERT INTO social_accounts (workspace_id, brand_id, handle)
            SELECT brands.workspace_id, brands.id, $3
            FROM brands
            WHERE brands.id = $1
              AND brands.workspace_id = $2
            RETURNING id
            "#,
        )
        .bind(brand_id.as_uuid())
        .bind(workspace_id.as_uuid())
        .bind(handle)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(database_error) = &error
                && database_error.code().as_deref() == Some("23505")
            {
                return AppError::Conflict(format!(
                    "account '{handle}' is already connected to brand '{brand_id}'"
                ));
            }
            AppError::Internal(format!("failed to connect social account: {error}"))
        })?
        .ok_or_else(|| {
            AppError::BrandNotFound(format!(
                "brand '{brand_id}' does not exist in workspace '{workspace_id}'"
            ))
        })?;

        Ok(SocialAccountSummary {
            social_account_id: social_account_id.to_string(),
            brand_id,
            handle: handle.to_owned(),
        })
    }
}

fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(database_error) if database_error.code().as_deref() == Some("23503")
    )
}
