use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use brandroom_application::SubscriptionRepository;
use brandroom_core::{AppError, AppResult, WorkspaceId};
use brandroom_domain::{Plan, Subscription, SubscriptionStatus};

/// PostgreSQL-backed subscription reader.
///
/// Subscriptions are written by the billing integration; this adapter only
/// reads them.
#[derive(Clone)]
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SubscriptionRow {
    plan: String,
    status: String,
    period_start: Option<DateTime<Utc>>,
    period_end: Option<DateTime<Utc>>,
    cancel_at: Option<DateTime<Utc>>,
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn find_subscription(
        &self,
        workspace_id: WorkspaceId,
    ) -> AppResult<Option<Subscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT plan, status, period_start, period_end, cancel_at
            FROM subscriptions
            WHERE workspace_id = $1
            "#,
        )
        .bind(workspace_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load subscription for workspace '{workspace_id}': {error}"
            ))
        })?;

        row.map(|row| subscription_from_row(workspace_id, row))
            .transpose()
    }
}

fn subscription_from_row(
    workspace_id: WorkspaceId,
    row: SubscriptionRow,
) -> AppResult<Subscription> {
    let plan = Plan::from_str(row.plan.as_str()).map_err(|error| {
        AppError::Internal(format!(
            "invalid stored plan '{}' for workspace '{workspace_id}': {error}",
            row.plan
        ))
    })?;
    let status = SubscriptionStatus::from_str(row.status.as_str()).map_err(|error| {
        AppError::Internal(format!(
            "invalid stored subscription status '{}' for workspace '{workspace_id}': {error}",
            row.status
        ))
    })?;

    Ok(Subscription {
        workspace_id,
        plan,
        status,
        period_start: row.period_start,
        period_end: row.period_end,
        cancel_at: row.cancel_at,
    })
}
