//! Route definitions for the Store Inspection Platform

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes
        .nest("/auth", auth_routes(state.clone()))
        // Protected routes - checklist template
        .route(
            "/checklist",
            get(handlers::get_checklist)
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Protected routes - store management
        .nest("/stores", store_routes(state.clone()))
        // Protected routes - inspections
        .nest("/inspections", inspection_routes(state.clone()))
        // Protected routes - dashboards and export
        .nest("/reports", reporting_routes(state))
}

/// Authentication routes
fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/sign-out", post(handlers::sign_out))
        .route("/session", get(handlers::session))
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/sign-in", post(handlers::sign_in))
        .route("/refresh", post(handlers::refresh))
        .merge(protected)
}

/// Store management routes (protected)
fn store_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_stores).post(handlers::create_store))
        .route(
            "/:store_id",
            get(handlers::get_store).delete(handlers::delete_store),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Inspection routes (protected)
fn inspection_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_inspections).post(handlers::create_inspection),
        )
        .route(
            "/:inspection_id",
            get(handlers::get_inspection).delete(handlers::delete_inspection),
        )
        .route(
            "/:inspection_id/items/:item_id",
            patch(handlers::set_item_fixed),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Reporting routes (protected)
fn reporting_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/inspections", get(handlers::export_inspections))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
