//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod plan;
mod security;
mod subscription;

pub use plan::{LimitKey, LimitValue, Plan, PlanCatalog, PlanLimitEntry};
pub use security::{
    BuiltInRole, PermissionDefinition, PermissionRegistry, PermissionSubset, WorkspaceRole,
    permission_keys,
};
pub use subscription::{Subscription, SubscriptionStatus};
