use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use brandroom_core::{UserIdentity, WorkspaceId};
use brandroom_domain::permission_keys;

use crate::dto::{CreateWorkspaceRequest, PermissionsResponse, UsageResponse, WorkspaceResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_workspace_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateWorkspaceRequest>,
) -> ApiResult<(StatusCode, Json<WorkspaceResponse>)> {
    let workspace = state
        .workspace_service
        .create_workspace(&user, payload.name.as_str())
        .await?;

    Ok((StatusCode::CREATED, Json(WorkspaceResponse::from(workspace))))
}

pub async fn workspace_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(workspace_id): Path<String>,
) -> ApiResult<Json<PermissionsResponse>> {
    let workspace_id = WorkspaceId::parse(workspace_id.as_str())?;
    let permissions = state
        .workspace_service
        .permissions(&user, workspace_id)
        .await?
        .into_iter()
        .collect();

    Ok(Json(PermissionsResponse {
        workspace_id: workspace_id.to_string(),
        permissions,
    }))
}

pub async fn provision_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(workspace_id): Path<String>,
) -> ApiResult<StatusCode> {
    let workspace_id = WorkspaceId::parse(workspace_id.as_str())?;
    state
        .workspace_service
        .reprovision_roles(&user, workspace_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn workspace_usage_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(workspace_id): Path<String>,
) -> ApiResult<Json<UsageResponse>> {
    let workspace_id = WorkspaceId::parse(workspace_id.as_str())?;
    state
        .authorization_service
        .require_permission(user.user_id(), workspace_id, permission_keys::BRAND_VIEW)
        .await?;

    let report = state.limit_service.usage_report(workspace_id).await?;

    Ok(Json(UsageResponse::new(workspace_id.to_string(), report)))
}
