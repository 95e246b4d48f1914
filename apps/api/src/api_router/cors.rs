use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method};
use brandroom_core::AppError;
use tower_http::cors::CorsLayer;

/// Single-origin CORS policy for the frontend.
pub(super) fn build_cors_layer(
    frontend_url: &str,
    identity_header: &str,
) -> Result<CorsLayer, AppError> {
    let origin = HeaderValue::from_str(frontend_url)
        .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?;
    let identity_header = HeaderName::from_bytes(identity_header.as_bytes())
        .map_err(|error| AppError::Internal(format!("invalid IDENTITY_HEADER: {error}")))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, identity_header]))
}
