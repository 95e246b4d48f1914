use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use brandroom_core::{BrandId, UserIdentity, WorkspaceId};

use crate::dto::{
    BrandResponse, ConnectSocialAccountRequest, CreateBrandRequest, SocialAccountResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_brand_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(workspace_id): Path<String>,
    Json(payload): Json<CreateBrandRequest>,
) -> ApiResult<(StatusCode, Json<BrandResponse>)> {
    let workspace_id = WorkspaceId::parse(workspace_id.as_str())?;
    let brand = state
        .workspace_service
        .create_brand(&user, workspace_id, payload.name.as_str())
        .await?;

    Ok((StatusCode::CREATED, Json(BrandResponse::from(brand))))
}

pub async fn connect_social_account_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((workspace_id, brand_id)): Path<(String, String)>,
    Json(payload): Json<ConnectSocialAccountRequest>,
) -> ApiResult<(StatusCode, Json<SocialAccountResponse>)> {
    let workspace_id = WorkspaceId::parse(workspace_id.as_str())?;
    let brand_id = BrandId::parse(brand_id.as_str())?;
    let account = state
        .workspace_service
        .connect_social_account(&user, workspace_id, brand_id, payload.handle.as_str())
        .await?;

    Ok((StatusCode::CREATED, Json(SocialAccountResponse::from(account))))
}
