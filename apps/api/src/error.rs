use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use brandroom_core::{AppError, LimitDecision};
use serde::Serialize;
use tracing::{debug, error};
use ts_rs::TS;

/// Quota decision attached to limit rejections.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/limit-decision-response.ts"
)]
pub struct LimitDecisionResponse {
    pub limit_key: String,
    pub plan: String,
    #[ts(type = "number")]
    pub limit: u64,
    #[ts(type = "number")]
    pub current: u64,
    #[ts(type = "number")]
    pub requested_amount: u64,
}

impl From<&LimitDecision> for LimitDecisionResponse {
    fn from(value: &LimitDecision) -> Self {
        Self {
            limit_key: value.limit_key.clone(),
            plan: value.plan.clone(),
            limit: value.limit,
            current: value.current,
            requested_amount: value.requested_amount,
        }
    }
}

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    decision: Option<LimitDecisionResponse>,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::BrandNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::LimitExceeded(_) => StatusCode::PAYMENT_REQUIRED,
            AppError::UnsupportedLimit(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        } else if self.0.is_limit_error() {
            debug!(error = %self.0, "request rejected by quota enforcement");
        }

        let decision = match &self.0 {
            AppError::LimitExceeded(decision) => Some(LimitDecisionResponse::from(&**decision)),
            _ => None,
        };

        let payload = Json(ErrorResponse {
            message: self.0.to_string(),
            decision,
        });

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
