use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::{
    AppState,
    auth::auth_middleware,
    handlers::{directory, market, settings, users},
    policy::{Capability, require_capability},
};

/// Authenticated Router Module
///
/// Routes open to every signed-in, active account. Market features sit behind an
/// extra capability gate per data tier; everything else only needs a valid session.
pub fn authenticated_routes(state: AppState) -> Router<AppState> {
    let session = Router::new()
        // GET|PUT /api/user/profile
        .route(
            "/api/user/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route("/api/user/change-password", post(users::change_password))
        // --- Settings (read side) ---
        .route("/api/settings", get(settings::list_settings))
        .route(
            "/api/settings/group/{group}",
            get(settings::list_group_settings),
        )
        .route("/api/settings/{key}", get(settings::get_setting))
        // --- Board members are not on the public site ---
        .route("/api/board-members", get(directory::list_board_members))
        .route("/api/board-members/{id}", get(directory::get_board_member));

    let market_data = Router::new()
        .route(
            "/api/marketdata/subscription",
            get(market::get_subscription).post(market::create_subscription),
        )
        .route(
            "/api/marketdata/subscription/{id}",
            put(market::update_subscription).delete(market::cancel_subscription),
        )
        .route(
            "/api/marketdata/alerts",
            get(market::list_alerts).post(market::create_alert),
        )
        .route(
            "/api/marketdata/alerts/{id}",
            get(market::get_alert)
                .put(market::update_alert)
                .delete(market::delete_alert),
        )
        .route_layer(middleware::from_fn_with_state(
            Capability::AccessMarketData,
            require_capability,
        ));

    let realtime = Router::new()
        .route("/api/marketdata/realtime", get(market::get_realtime))
        .route_layer(middleware::from_fn_with_state(
            Capability::AccessRealTimeData,
            require_capability,
        ));

    let historical = Router::new()
        .route("/api/marketdata/analytics", get(market::get_market_analytics))
        .route_layer(middleware::from_fn_with_state(
            Capability::AccessHistoricalData,
            require_capability,
        ));

    // The auth layer is added last so it runs first and the capability gates can
    // read the resolved user.
    session
        .merge(market_data)
        .merge(realtime)
        .merge(historical)
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
