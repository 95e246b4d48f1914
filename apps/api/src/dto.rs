use brandroom_application::{
    BrandSummary, LimitUsage, SocialAccountSummary, UsageReport, WorkspaceMember,
    WorkspaceSummary,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Incoming payload for workspace creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-workspace-request.ts"
)]
pub struct CreateWorkspaceRequest {
    pub name: String,
}

/// API representation of a workspace.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/workspace-response.ts"
)]
pub struct WorkspaceResponse {
    pub workspace_id: String,
    pub name: String,
    pub plan: String,
}

impl From<WorkspaceSummary> for WorkspaceResponse {
    fn from(value: WorkspaceSummary) -> Self {
        Self {
            workspace_id: value.workspace_id.to_string(),
            name: value.name,
            plan: value.plan.as_str().to_owned(),
        }
    }
}

/// Effective permissions of the caller in one workspace.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permissions-response.ts"
)]
pub struct PermissionsResponse {
    pub workspace_id: String,
    pub permissions: Vec<String>,
}

/// Incoming payload for brand creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-brand-request.ts"
)]
pub struct CreateBrandRequest {
    pub name: String,
}

/// API representation of a brand.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/brand-response.ts"
)]
pub struct BrandResponse {
    pub brand_id: String,
    pub workspace_id: String,
    pub name: String,
}

impl From<BrandSummary> for BrandResponse {
    fn from(value: BrandSummary) -> Self {
        Self {
            brand_id: value.brand_id.to_string(),
            workspace_id: value.workspace_id.to_string(),
            name: value.name,
        }
    }
}

/// Incoming payload for connecting a social account to a brand.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/connect-social-account-request.ts"
)]
pub struct ConnectSocialAccountRequest {
    pub handle: String,
}

/// API representation of a connected social account.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/social-account-response.ts"
)]
pub struct SocialAccountResponse {
    pub social_account_id: String,
    pub brand_id: String,
    pub handle: String,
}

impl From<SocialAccountSummary> for SocialAccountResponse {
    fn from(value: SocialAccountSummary) -> Self {
        Self {
            social_account_id: value.social_account_id,
            brand_id: value.brand_id.to_string(),
            handle: value.handle,
        }
    }
}

/// Incoming payload for adding a workspace member.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/add-member-request.ts"
)]
pub struct AddMemberRequest {
    pub user_id: String,
    /// One of `ADMIN` or `MEMBER`.
    pub role: String,
}

/// Incoming payload for changing a member role.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-member-role-request.ts"
)]
pub struct UpdateMemberRoleRequest {
    pub role: String,
}

/// API representation of a workspace member.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/member-response.ts"
)]
pub struct MemberResponse {
    pub workspace_id: String,
    pub user_id: String,
    pub role: String,
}

impl From<WorkspaceMember> for MemberResponse {
    fn from(value: WorkspaceMember) -> Self {
        Self {
            workspace_id: value.workspace_id.to_string(),
            user_id: value.user_id.to_string(),
            role: value.role.as_str().to_owned(),
        }
    }
}

/// One quota line of the usage report.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/usage-line-response.ts"
)]
pub struct UsageLineResponse {
    pub limit_key: String,
    /// `null` when the plan does not cap this key.
    #[ts(type = "number | null")]
    pub limit: Option<u64>,
    pub unlimited: bool,
    #[ts(type = "number")]
    pub current: u64,
}

impl From<LimitUsage> for UsageLineResponse {
    fn from(value: LimitUsage) -> Self {
        Self {
            limit: value.limit.numeric().map(|limit| limit.get()),
            unlimited: value.limit.is_unlimited(),
            limit_key: value.limit_key,
            current: value.current,
        }
    }
}

/// Plan and quota consumption of a workspace.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/usage-response.ts"
)]
pub struct UsageResponse {
    pub workspace_id: String,
    pub plan: String,
    pub limits: Vec<UsageLineResponse>,
}

impl UsageResponse {
    pub fn new(workspace_id: String, report: UsageReport) -> Self {
        Self {
            workspace_id,
            plan: report.plan.as_str().to_owned(),
            limits: report
                .lines
                .into_iter()
                .map(UsageLineResponse::from)
                .collect(),
        }
    }
}
