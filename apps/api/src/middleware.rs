use std::collections::HashMap;

use axum::extract::{Extension, Path, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use brandroom_application::{EnforcementGuard, LimitScope};
use brandroom_core::{AppError, BrandId, UserId, UserIdentity, WorkspaceId};

use crate::error::ApiResult;
use crate::state::AppState;

/// Resolves the caller from the trusted identity header set by the gateway.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let raw_user_id = request
        .headers()
        .get(&*state.identity_header)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let user_id = UserId::parse(raw_user_id)
        .map_err(|_| AppError::Unauthorized("invalid identity header".to_owned()))?;

    request.extensions_mut().insert(UserIdentity::new(user_id));
    Ok(next.run(request).await)
}

/// Runs one quota guard before the wrapped handler.
///
/// The workspace and brand scope come from the `workspace_id` and `brand_id`
/// path parameters.
pub async fn enforce_limit(
    State(guard): State<EnforcementGuard>,
    Extension(user): Extension<UserIdentity>,
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let workspace_id = params
        .get("workspace_id")
        .ok_or_else(|| {
            AppError::Internal(format!(
                "limit guard '{}' is mounted without a workspace path parameter",
                guard.limit_key()
            ))
        })
        .and_then(|value| WorkspaceId::parse(value))?;
    let brand_id = params
        .get("brand_id")
        .map(|value| BrandId::parse(value))
        .transpose()?;

    guard
        .enforce(LimitScope {
            workspace_id,
            user_id: Some(user.user_id()),
            brand_id,
        })
        .await?;

    Ok(next.run(request).await)
}
