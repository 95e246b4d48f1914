//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization_service;
mod limit_service;
mod role_provisioning;
mod workspace_service;

pub use authorization_service::{
    AuthorizationService, WorkspaceRoleDefinition, WorkspaceRoleRepository,
};
pub use limit_service::{
    CheckLimitInput, DefaultLimitContext, EnforcementGuard, LimitCheck, LimitContext,
    LimitContextResolver, LimitEnforcer, LimitOutcome, LimitScope, LimitService, LimitUsage,
    SubscriptionRepository, UsageCounter, UsageReport,
};
pub use role_provisioning::{RoleProvisioner, RoleProvisioningStore};
pub use workspace_service::{
    BrandRepository, BrandSummary, SocialAccountSummary, WorkspaceMember, WorkspaceRepository,
    WorkspaceService, WorkspaceSummary,
};
