use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use brandroom_core::{UserId, UserIdentity, WorkspaceId};
use brandroom_domain::WorkspaceRole;

use crate::dto::{AddMemberRequest, MemberResponse, UpdateMemberRoleRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn add_member_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(workspace_id): Path<String>,
    Json(payload): Json<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<MemberResponse>)> {
    let workspace_id = WorkspaceId::parse(workspace_id.as_str())?;
    let member_id = UserId::parse(payload.user_id.as_str())?;
    let role = WorkspaceRole::from_str(payload.role.trim())?;

    let member = state
        .workspace_service
        .add_member(&user, workspace_id, member_id, role)
        .await?;

    Ok((StatusCode::CREATED, Json(MemberResponse::from(member))))
}

pub async fn update_member_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((workspace_id, member_id)): Path<(String, String)>,
    Json(payload): Json<UpdateMemberRoleRequest>,
) -> ApiResult<StatusCode> {
    let workspace_id = WorkspaceId::parse(workspace_id.as_str())?;
    let member_id = UserId::parse(member_id.as_str())?;
    let role = WorkspaceRole::from_str(payload.role.trim())?;

    state
        .workspace_service
        .change_member_role(&user, workspace_id, member_id, role)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_member_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((workspace_id, member_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let workspace_id = WorkspaceId::parse(workspace_id.as_str())?;
    let member_id = UserId::parse(member_id.as_str())?;

    state
        .workspace_service
        .remove_member(&user, workspace_id, member_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
