use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    AppState,
    handlers::{
        auth, directory, health, market, menus, pages, posts,
        settings::{self, public_settings_map},
    },
    models::setting::PUBLIC_GROUPS,
};

/// Public Router Module
///
/// Unauthenticated endpoints. Anything content-like served here is filtered down to
/// its live state (published, active, open) by the handler before it leaves.
pub fn public_routes() -> Router<AppState> {
    let router = Router::new()
        // GET /health
        // Liveness check for load balancers; never touches the store.
        .route("/health", get(health::health))
        // --- Identity ---
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        // --- Content ---
        .route("/api/posts", get(posts::list_public_posts))
        .route("/api/posts/{slug}", get(posts::get_public_post))
        .route("/api/pages/{slug}", get(pages::get_public_page))
        .route(
            "/api/menus/location/{location}",
            get(menus::get_menu_by_location),
        )
        // --- Settings ---
        .route("/api/settings/public", get(settings::get_public_settings))
        .route(
            "/api/settings/public/{group}",
            get(settings::get_public_group),
        )
        // --- Directories ---
        .route("/api/team-members", get(directory::list_team_members))
        .route("/api/team-members/{id}", get(directory::get_team_member))
        .route("/api/traders", get(directory::list_traders))
        .route("/api/traders/{id}", get(directory::get_trader))
        .route("/api/brokers", get(directory::list_brokers))
        .route("/api/brokers/{id}", get(directory::get_broker))
        .route("/api/partners", get(directory::list_active_partners))
        .route("/api/partners/{id}", get(directory::get_partner))
        .route(
            "/api/partners/category/{category}",
            get(directory::list_partners_by_category),
        )
        .route("/api/publications", get(directory::list_publications))
        .route("/api/publications/{id}", get(directory::get_publication))
        .route("/api/careers", get(directory::list_open_careers))
        .route("/api/careers/{id}", get(directory::get_career))
        .route("/api/commodities", get(directory::list_active_commodities))
        .route("/api/commodities/{id}", get(directory::get_commodity))
        // --- Market data ---
        .route("/api/marketdata/prices", get(market::get_current_prices))
        .route(
            "/api/marketdata/prices/{commodity}",
            get(market::get_commodity_prices),
        )
        .route("/api/marketdata/history", get(market::get_price_history))
        .route(
            "/api/marketdata/summary/{commodity}",
            get(market::get_market_summary),
        )
        .route("/api/marketdata/plans", get(market::get_plans));

    // GET /api/settings/{hero,services,why_join,cta,market_data}
    // Section shortcuts used by the public site. Static segments win over the
    // authenticated `/api/settings/{key}` lookup.
    PUBLIC_GROUPS.into_iter().fold(router, |router, group| {
        router.route(
            &format!("/api/settings/{group}"),
            get(move |State(state): State<AppState>| async move {
                public_settings_map(&state.repo, Some(group)).await.map(Json)
            }),
        )
    })
}
