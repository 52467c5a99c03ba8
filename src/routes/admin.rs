use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::{
    AppState,
    auth::auth_middleware,
    handlers::{market, settings, users},
    policy::{Capability, require_capability},
};

/// Admin Router Module
///
/// Administrator-only endpoints. Two gates, one per capability, both resolving to
/// the admin role today.
pub fn admin_routes(state: AppState) -> Router<AppState> {
    let user_admin = Router::new()
        .route(
            "/api/admin/users",
            get(users::list_users).post(users::create_user),
        )
        .route("/api/admin/users/{id}", put(users::update_user_access))
        // --- Market-data maintenance ---
        .route("/api/admin/marketdata/prices", post(market::create_price))
        .route(
            "/api/admin/marketdata/prices/{id}",
            put(market::update_price).delete(market::delete_price),
        )
        .route(
            "/api/admin/marketdata/plans",
            get(market::list_all_plans).post(market::create_plan),
        )
        .route(
            "/api/admin/marketdata/plans/{id}",
            put(market::update_plan).delete(market::delete_plan),
        )
        .route_layer(middleware::from_fn_with_state(
            Capability::ManageUsers,
            require_capability,
        ));

    let settings_admin = Router::new()
        .route("/api/settings", post(settings::create_setting))
        // PUT /api/settings/batch
        // Registered as a static segment so it is never read as a key.
        .route("/api/settings/batch", put(settings::update_settings_batch))
        .route(
            "/api/settings/{key}",
            put(settings::update_setting).delete(settings::delete_setting),
        )
        .route_layer(middleware::from_fn_with_state(
            Capability::ManageSettings,
            require_capability,
        ));

    user_admin
        .merge(settings_admin)
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
