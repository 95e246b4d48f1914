use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use brandroom_core::{AppResult, BrandId, UserId, WorkspaceId};
use brandroom_domain::Plan;

use super::service::{CheckLimitInput, LimitService};

/// Request scope the guard evaluates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitScope {
    /// Workspace addressed by the request.
    pub workspace_id: WorkspaceId,
    /// Authenticated user, when known.
    pub user_id: Option<UserId>,
    /// Brand addressed by the request, when the route is brand-scoped.
    pub brand_id: Option<BrandId>,
}

/// Per-request overrides supplied by a context resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LimitContext {
    /// Pre-computed usage; counted through the usage port when absent.
    pub current: Option<u64>,
    /// Units the request consumes; defaults to one.
    pub amount: Option<u64>,
    /// Plan to evaluate instead of the workspace subscription.
    pub plan_override: Option<Plan>,
}

/// Caller-supplied callback computing the limit context of a request.
#[async_trait]
pub trait LimitContextResolver: Send + Sync {
    /// Resolves usage, amount and plan overrides for the scope.
    async fn resolve(&self, scope: &LimitScope) -> AppResult<LimitContext>;
}

#[async_trait]
impl<F, Fut> LimitContextResolver for F
where
    F: Fn(LimitScope) -> Fut + Send + Sync,
    Fut: Future<Output = AppResult<LimitContext>> + Send + 'static,
{
    async fn resolve(&self, scope: &LimitScope) -> AppResult<LimitContext> {
        (self)(*scope).await
    }
}

/// Resolver leaving every value to the limit service: one unit, counted usage.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLimitContext;

#[async_trait]
impl LimitContextResolver for DefaultLimitContext {
    async fn resolve(&self, _scope: &LimitScope) -> AppResult<LimitContext> {
        Ok(LimitContext::default())
    }
}

/// Boundary adapter enforcing one limit key before a request proceeds.
#[derive(Clone)]
pub struct EnforcementGuard {
    limit_key: String,
    resolver: Arc<dyn LimitContextResolver>,
    limit_service: LimitService,
}

impl EnforcementGuard {
    pub(super) fn new(
        limit_key: impl Into<String>,
        resolver: Arc<dyn LimitContextResolver>,
        limit_service: LimitService,
    ) -> Self {
        Self {
            limit_key: limit_key.into(),
            resolver,
            limit_service,
        }
    }

    /// Returns the guarded limit key.
    #[must_use]
    pub fn limit_key(&self) -> &str {
        self.limit_key.as_str()
    }

    /// Resolves the request context and checks the limit.
    ///
    /// `Ok(())` lets the request proceed. Resolver errors are returned
    /// unchanged.
    pub async fn enforce(&self, scope: LimitScope) -> AppResult<()> {
        let context = self.resolver.resolve(&scope).await?;

        self.limit_service
            .check_limit(CheckLimitInput {
                limit_key: self.limit_key.clone(),
                workspace_id: scope.workspace_id,
                brand_id: scope.brand_id,
                user_id: scope.user_id,
                amount: context.amount,
                current: context.current,
                plan_override: context.plan_override,
            })
            .await
    }
}
