use std::sync::Arc;

use brandroom_core::{AppError, AppResult, BrandId, UserId, WorkspaceId};
use brandroom_domain::{LimitKey, LimitValue, Plan, PlanCatalog};
use chrono::Utc;
use tracing::{debug, warn};

use super::enforcer::{LimitCheck, LimitEnforcer};
use super::guard::{EnforcementGuard, LimitContextResolver};
use super::ports::{SubscriptionRepository, UsageCounter};

/// Input for one quota check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckLimitInput {
    /// Quota dimension.
    pub limit_key: String,
    /// Workspace the request acts on.
    pub workspace_id: WorkspaceId,
    /// Brand scope for brand-scoped dimensions.
    pub brand_id: Option<BrandId>,
    /// Acting user, recorded for diagnostics.
    pub user_id: Option<UserId>,
    /// Units the request consumes; defaults to one.
    pub amount: Option<u64>,
    /// Pre-computed usage; counted through the usage port when absent.
    pub current: Option<u64>,
    /// Plan to evaluate instead of the workspace subscription.
    pub plan_override: Option<Plan>,
}

impl CheckLimitInput {
    /// Creates an input for one unit of `limit_key` in a workspace.
    #[must_use]
    pub fn new(limit_key: impl Into<String>, workspace_id: WorkspaceId) -> Self {
        Self {
            limit_key: limit_key.into(),
            workspace_id,
            brand_id: None,
            user_id: None,
            amount: None,
            current: None,
            plan_override: None,
        }
    }
}

/// Usage line of a workspace report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitUsage {
    /// Quota dimension.
    pub limit_key: String,
    /// Ceiling on the effective plan.
    pub limit: LimitValue,
    /// Units currently consumed.
    pub current: u64,
}

/// Usage of every catalog dimension on the plan it was evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageReport {
    /// Effective plan the ceilings were read from.
    pub plan: Plan,
    /// One line per catalog dimension, in catalog order.
    pub lines: Vec<LimitUsage>,
}

/// Application service resolving plan and usage around the pure enforcer.
#[derive(Clone)]
pub struct LimitService {
    enforcer: LimitEnforcer,
    subscription_repository: Arc<dyn SubscriptionRepository>,
    usage_counter: Arc<dyn UsageCounter>,
}

impl LimitService {
    /// Creates a limit service.
    #[must_use]
    pub fn new(
        catalog: Arc<PlanCatalog>,
        subscription_repository: Arc<dyn SubscriptionRepository>,
        usage_counter: Arc<dyn UsageCounter>,
    ) -> Self {
        Self {
            enforcer: LimitEnforcer::new(catalog),
            subscription_repository,
            usage_counter,
        }
    }

    /// Returns the plan whose ceilings currently apply to the workspace.
    ///
    /// A workspace without a subscription row is on the free tier.
    pub async fn effective_plan(&self, workspace_id: WorkspaceId) -> AppResult<Plan> {
        Ok(self
            .subscription_repository
            .find_subscription(workspace_id)
            .await?
            .map(|subscription| subscription.effective_plan(Utc::now()))
            .unwrap_or(Plan::Free))
    }

    /// Checks that the request fits the workspace plan.
    ///
    /// Fails with `UnsupportedLimit` for keys no plan declares, with
    /// `LimitExceeded` on a breach, and passes usage-port errors through.
    pub async fn check_limit(&self, input: CheckLimitInput) -> AppResult<()> {
        let limit_key = LimitKey::new(input.limit_key)
            .map_err(|error| AppError::UnsupportedLimit(error.to_string()))?;
        if !self.enforcer.catalog().knows_key(limit_key.as_str()) {
            return Err(AppError::UnsupportedLimit(format!(
                "limit key '{limit_key}' is not declared by any plan"
            )));
        }

        let plan = match input.plan_override {
            Some(plan) => plan,
            None => self.effective_plan(input.workspace_id).await?,
        };

        let current = match input.current {
            Some(current) => current,
            None => {
                self.usage_counter
                    .count_current_usage(
                        limit_key.resource_key(),
                        input.workspace_id,
                        input.brand_id,
                    )
                    .await?
            }
        };
        let amount = input.amount.unwrap_or(1);

        let result = self.enforcer.check(LimitCheck {
            limit_key: limit_key.as_str(),
            workspace_id: input.workspace_id,
            plan,
            current,
            amount,
        });

        match &result {
            Ok(()) => debug!(
                workspace_id = %input.workspace_id,
                limit_key = limit_key.as_str(),
                plan = plan.as_str(),
                current,
                amount,
                "limit check passed"
            ),
            Err(error) => warn!(
                workspace_id = %input.workspace_id,
                user_id = ?input.user_id,
                limit_key = limit_key.as_str(),
                plan = plan.as_str(),
                %error,
                "limit check denied"
            ),
        }

        result
    }

    /// Reports every catalog dimension against current usage for the workspace.
    ///
    /// Brand-scoped dimensions carry the count of the brand closest to its
    /// ceiling, so a line reads like a check against that brand would.
    pub async fn usage_report(&self, workspace_id: WorkspaceId) -> AppResult<UsageReport> {
        let plan = self.effective_plan(workspace_id).await?;
        let catalog = self.enforcer.catalog();
        let mut lines = Vec::new();

        for entry in catalog.limits_for(plan) {
            let current = self
                .usage_counter
                .count_current_usage(entry.key.resource_key(), workspace_id, None)
                .await?;

            lines.push(LimitUsage {
                limit_key: entry.key.as_str().to_owned(),
                limit: entry.value,
                current,
            });
        }

        Ok(UsageReport { plan, lines })
    }

    /// Creates a request guard for one limit key.
    #[must_use]
    pub fn create_limit_guard(
        &self,
        limit_key: impl Into<String>,
        resolver: Arc<dyn LimitContextResolver>,
    ) -> EnforcementGuard {
        EnforcementGuard::new(limit_key, resolver, self.clone())
    }
}
