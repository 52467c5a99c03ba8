use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
};

use crate::{
    AppState,
    auth::auth_middleware,
    handlers::{dashboard, directory, media, menus, pages, posts},
    policy::{Capability, require_capability},
};

/// Room for the multipart envelope around a maximum-size file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// CMS Router Module
///
/// Everything behind the `ManageContent` capability (admins and bloggers).
/// Ownership of individual pages and posts is checked inside the handlers.
pub fn cms_routes(state: AppState) -> Router<AppState> {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes + MULTIPART_OVERHEAD);

    Router::new()
        // --- Dashboard ---
        .route("/api/cms/dashboard/stats", get(dashboard::get_stats))
        .route("/api/cms/dashboard/activity", get(dashboard::get_activity))
        // --- Posts ---
        .route(
            "/api/cms/posts",
            get(posts::list_posts).post(posts::create_post),
        )
        .route(
            "/api/cms/posts/{id}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        // --- Pages ---
        .route(
            "/api/pages",
            get(pages::list_pages).post(pages::create_page),
        )
        .route(
            "/api/pages/id/{id}",
            get(pages::get_page)
                .put(pages::update_page)
                .delete(pages::delete_page),
        )
        // --- Media ---
        // POST /api/media and POST /api/upload accept the same multipart form.
        .route(
            "/api/media",
            get(media::list_media)
                .post(media::upload_media)
                .layer(upload_limit.clone()),
        )
        .route(
            "/api/upload",
            post(media::upload_media).layer(upload_limit),
        )
        .route(
            "/api/media/{id}",
            get(media::get_media).delete(media::delete_media),
        )
        // --- Menus ---
        .route(
            "/api/menus",
            get(menus::list_menus).post(menus::create_menu),
        )
        .route(
            "/api/menus/id/{id}",
            get(menus::get_menu)
                .put(menus::update_menu)
                .delete(menus::delete_menu),
        )
        .route(
            "/api/menus/{menu_id}/items",
            get(menus::list_menu_items).post(menus::create_menu_item),
        )
        .route(
            "/api/menu-items/{id}",
            put(menus::update_menu_item).delete(menus::delete_menu_item),
        )
        // --- Directories ---
        .route("/api/team-members", post(directory::create_team_member))
        .route(
            "/api/team-members/{id}",
            put(directory::update_team_member).delete(directory::delete_team_member),
        )
        .route(
            "/api/team-members/reorder",
            put(directory::reorder_team_members),
        )
        .route("/api/board-members", post(directory::create_board_member))
        .route(
            "/api/board-members/{id}",
            put(directory::update_board_member).delete(directory::delete_board_member),
        )
        .route(
            "/api/board-members/reorder",
            put(directory::reorder_board_members),
        )
        .route("/api/traders", post(directory::create_trader))
        .route(
            "/api/traders/{id}",
            put(directory::update_trader).delete(directory::delete_trader),
        )
        .route("/api/brokers", post(directory::create_broker))
        .route(
            "/api/brokers/{id}",
            put(directory::update_broker).delete(directory::delete_broker),
        )
        .route("/api/partners", post(directory::create_partner))
        .route(
            "/api/partners/{id}",
            put(directory::update_partner).delete(directory::delete_partner),
        )
        .route("/api/cms/partners", get(directory::list_all_partners))
        .route("/api/publications", post(directory::create_publication))
        .route(
            "/api/publications/{id}",
            put(directory::update_publication).delete(directory::delete_publication),
        )
        .route(
            "/api/cms/publications",
            get(directory::list_all_publications),
        )
        .route("/api/careers", post(directory::create_career))
        .route(
            "/api/careers/{id}",
            put(directory::update_career).delete(directory::delete_career),
        )
        .route("/api/cms/careers", get(directory::list_all_careers))
        .route("/api/commodities", post(directory::create_commodity))
        .route(
            "/api/commodities/{id}",
            put(directory::update_commodity).delete(directory::delete_commodity),
        )
        .route("/api/cms/commodities", get(directory::list_all_commodities))
        .route_layer(middleware::from_fn_with_state(
            Capability::ManageContent,
            require_capability,
        ))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
