use std::sync::Arc;

use brandroom_core::{AppError, AppResult, LimitDecision, WorkspaceId};
use brandroom_domain::{LimitValue, Plan, PlanCatalog};

/// Input of one quota decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitCheck<'a> {
    /// Quota dimension.
    pub limit_key: &'a str,
    /// Workspace the request acts on.
    pub workspace_id: WorkspaceId,
    /// Plan to evaluate against, already resolved or overridden.
    pub plan: Plan,
    /// Units consumed before the request.
    pub current: u64,
    /// Units the request consumes.
    pub amount: u64,
}

/// Result of a quota decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitOutcome {
    /// The request fits the plan.
    Allow,
    /// The request would exceed the plan ceiling.
    Deny(LimitDecision),
}

/// Pure quota decision over an immutable plan catalog.
#[derive(Debug, Clone)]
pub struct LimitEnforcer {
    catalog: Arc<PlanCatalog>,
}

impl LimitEnforcer {
    /// Creates an enforcer over the given catalog.
    #[must_use]
    pub fn new(catalog: Arc<PlanCatalog>) -> Self {
        Self { catalog }
    }

    /// Returns the catalog backing decisions.
    #[must_use]
    pub fn catalog(&self) -> &PlanCatalog {
        self.catalog.as_ref()
    }

    /// Decides whether the request fits the plan.
    #[must_use]
    pub fn evaluate(&self, check: LimitCheck<'_>) -> LimitOutcome {
        match self.catalog.limit(check.plan, check.limit_key) {
            LimitValue::Unlimited => LimitOutcome::Allow,
            limited @ LimitValue::Limited(limit) => {
                if limited.admits(check.current, check.amount) {
                    LimitOutcome::Allow
                } else {
                    LimitOutcome::Deny(LimitDecision {
                        limit_key: check.limit_key.to_owned(),
                        plan: check.plan.as_str().to_owned(),
                        limit: limit.get(),
                        current: check.current,
                        requested_amount: check.amount,
                    })
                }
            }
        }
    }

    /// Decides and converts a denial into `AppError::LimitExceeded`.
    pub fn check(&self, check: LimitCheck<'_>) -> AppResult<()> {
        match self.evaluate(check) {
            LimitOutcome::Allow => Ok(()),
            LimitOutcome::Deny(decision) => Err(AppError::LimitExceeded(Box::new(decision))),
        }
    }
}
