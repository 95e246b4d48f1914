use std::sync::Arc;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use brandroom_application::DefaultLimitContext;
use brandroom_core::AppError;
use brandroom_domain::LimitKey;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

use cors::build_cors_layer;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let cors_layer = build_cors_layer(frontend_url, &app_state.identity_header)?;

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes(&app_state))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}

fn protected_routes(app_state: &AppState) -> Router<AppState> {
    let limit_service = &app_state.limit_service;

    let brand_routes = Router::new()
        .route(
            "/api/workspaces/{workspace_id}/brands",
            post(handlers::brands::create_brand_handler),
        )
        .route_layer(from_fn_with_state(
            limit_service
                .create_limit_guard(LimitKey::BRAND_MAX_COUNT, Arc::new(DefaultLimitContext)),
            middleware::enforce_limit,
        ));

    let social_account_routes = Router::new()
        .route(
            "/api/workspaces/{workspace_id}/brands/{brand_id}/social-accounts",
            post(handlers::brands::connect_social_account_handler),
        )
        .route_layer(from_fn_with_state(
            limit_service.create_limit_guard(
                LimitKey::SOCIAL_ACCOUNT_MAX_COUNT_PER_BRAND,
                Arc::new(DefaultLimitContext),
            ),
            middleware::enforce_limit,
        ));

    let member_routes = Router::new()
        .route(
            "/api/workspaces/{workspace_id}/members",
            post(handlers::members::add_member_handler),
        )
        .route_layer(from_fn_with_state(
            limit_service
                .create_limit_guard(LimitKey::MEMBER_MAX_COUNT, Arc::new(DefaultLimitContext)),
            middleware::enforce_limit,
        ));

    Router::new()
        .route(
            "/api/workspaces",
            post(handlers::workspaces::create_workspace_handler),
        )
        .route(
            "/api/workspaces/{workspace_id}/permissions",
            get(handlers::workspaces::workspace_permissions_handler),
        )
        .route(
            "/api/workspaces/{workspace_id}/roles/provision",
            post(handlers::workspaces::provision_roles_handler),
        )
        .route(
            "/api/workspaces/{workspace_id}/usage",
            get(handlers::workspaces::workspace_usage_handler),
        )
        .route(
            "/api/workspaces/{workspace_id}/members/{user_id}",
            put(handlers::members::update_member_role_handler)
                .delete(handlers::members::remove_member_handler),
        )
        .merge(brand_routes)
        .merge(social_account_routes)
        .merge(member_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ))
}
