use async_trait::async_trait;
use brandroom_core::{AppResult, BrandId, WorkspaceId};
use brandroom_domain::Subscription;

/// Port for counting current resource consumption.
///
/// Counts must come from a strongly consistent read at call time; a stale
/// count lets requests slip past a ceiling.
#[async_trait]
pub trait UsageCounter: Send + Sync {
    /// Counts units of `resource_key` currently consumed by the workspace.
    ///
    /// Brand-scoped resources are counted within `brand_id`; a brand that
    /// does not exist in the workspace yields `AppError::BrandNotFound`.
    /// Without a brand, a brand-scoped resource reports the highest count of
    /// any single brand in the workspace, or zero when it has none.
    async fn count_current_usage(
        &self,
        resource_key: &str,
        workspace_id: WorkspaceId,
        brand_id: Option<BrandId>,
    ) -> AppResult<u64>;
}

/// Read port for workspace subscriptions.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Returns the subscription row of a workspace, if one exists.
    async fn find_subscription(&self, workspace_id: WorkspaceId)
    -> AppResult<Option<Subscription>>;
}
