use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// --- Module Structure ---

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod content;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod repository;
pub mod storage;

pub mod routes;
use routes::{admin, authenticated, cms, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::ApiError;
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{LocalDiskStorage, MockStorageService, StorageState};

/// ApiDoc
///
/// OpenAPI document assembled from every `#[utoipa::path]` handler and the schemas
/// they exchange. Served at `/api-docs/openapi.json`, browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::auth::register, handlers::auth::login,
        handlers::users::get_profile, handlers::users::update_profile,
        handlers::users::change_password, handlers::users::list_users,
        handlers::users::create_user, handlers::users::update_user_access,
        handlers::pages::get_public_page, handlers::pages::list_pages,
        handlers::pages::create_page, handlers::pages::get_page,
        handlers::pages::update_page, handlers::pages::delete_page,
        handlers::posts::list_public_posts, handlers::posts::get_public_post,
        handlers::posts::list_posts, handlers::posts::create_post, handlers::posts::get_post,
        handlers::posts::update_post, handlers::posts::delete_post,
        handlers::settings::get_public_settings, handlers::settings::get_public_group,
        handlers::settings::list_settings, handlers::settings::list_group_settings,
        handlers::settings::get_setting, handlers::settings::create_setting,
        handlers::settings::update_setting, handlers::settings::update_settings_batch,
        handlers::settings::delete_setting,
        handlers::menus::get_menu_by_location, handlers::menus::list_menus,
        handlers::menus::get_menu, handlers::menus::create_menu, handlers::menus::update_menu,
        handlers::menus::delete_menu, handlers::menus::list_menu_items,
        handlers::menus::create_menu_item, handlers::menus::update_menu_item,
        handlers::menus::delete_menu_item,
        handlers::directory::list_team_members, handlers::directory::get_team_member,
        handlers::directory::create_team_member, handlers::directory::update_team_member,
        handlers::directory::delete_team_member, handlers::directory::reorder_team_members,
        handlers::directory::list_board_members, handlers::directory::get_board_member,
        handlers::directory::create_board_member, handlers::directory::update_board_member,
        handlers::directory::delete_board_member, handlers::directory::reorder_board_members,
        handlers::directory::list_traders, handlers::directory::get_trader,
        handlers::directory::create_trader, handlers::directory::update_trader,
        handlers::directory::delete_trader,
        handlers::directory::list_brokers, handlers::directory::get_broker,
        handlers::directory::create_broker, handlers::directory::update_broker,
        handlers::directory::delete_broker,
        handlers::directory::list_active_partners, handlers::directory::list_partners_by_category,
        handlers::directory::list_all_partners, handlers::directory::get_partner,
        handlers::directory::create_partner, handlers::directory::update_partner,
        handlers::directory::delete_partner,
        handlers::directory::list_publications, handlers::directory::list_all_publications,
        handlers::directory::get_publication, handlers::directory::create_publication,
        handlers::directory::update_publication, handlers::directory::delete_publication,
        handlers::directory::list_open_careers, handlers::directory::list_all_careers,
        handlers::directory::get_career, handlers::directory::create_career,
        handlers::directory::update_career, handlers::directory::delete_career,
        handlers::directory::list_active_commodities, handlers::directory::list_all_commodities,
        handlers::directory::get_commodity, handlers::directory::create_commodity,
        handlers::directory::update_commodity, handlers::directory::delete_commodity,
        handlers::media::upload_media, handlers::media::list_media,
        handlers::media::get_media, handlers::media::delete_media,
        handlers::dashboard::get_stats, handlers::dashboard::get_activity,
        handlers::market::get_current_prices, handlers::market::get_commodity_prices,
        handlers::market::get_price_history, handlers::market::get_market_summary,
        handlers::market::get_plans, handlers::market::get_realtime,
        handlers::market::get_market_analytics,
        handlers::market::get_subscription, handlers::market::create_subscription,
        handlers::market::update_subscription, handlers::market::cancel_subscription,
        handlers::market::list_alerts, handlers::market::get_alert,
        handlers::market::create_alert, handlers::market::update_alert,
        handlers::market::delete_alert,
        handlers::market::create_price, handlers::market::update_price,
        handlers::market::delete_price, handlers::market::list_all_plans,
        handlers::market::create_plan, handlers::market::update_plan,
        handlers::market::delete_plan,
    ),
    components(
        schemas(
            error::ErrorBody, handlers::MessageResponse, handlers::health::HealthResponse,
            handlers::settings::PublicSettings,
            models::User, models::Role, models::AuthResponse, models::RegisterRequest,
            models::LoginRequest, models::UpdateProfileRequest, models::ChangePasswordRequest,
            models::CreateUserRequest, models::UpdateUserAccessRequest,
            models::Page, models::BlogPost, models::ContentStatus, models::CreatePageRequest,
            models::UpdatePageRequest, models::CreatePostRequest, models::UpdatePostRequest,
            models::Pagination,
            models::Setting, models::CreateSettingRequest, models::UpdateSettingRequest,
            models::SettingBatchItem, models::BatchUpdateRequest,
            models::setting::BatchUpdateResponse,
            models::Menu, models::MenuItem, models::MenuInput, models::MenuItemInput,
            models::MediaFile, models::DashboardStats, models::ActivityItem,
            models::directory::TeamMember, models::directory::TeamMemberInput,
            models::directory::BoardMember, models::directory::BoardMemberInput,
            models::directory::Trader, models::directory::TraderInput,
            models::directory::Broker, models::directory::BrokerInput,
            models::directory::Partner, models::directory::PartnerInput,
            models::directory::Publication, models::directory::PublicationInput,
            models::directory::Career, models::directory::CareerInput,
            models::directory::Commodity, models::directory::CommodityInput,
            models::directory::ReorderEntry, models::directory::ReorderRequest,
            models::market::SubscriptionPlan, models::market::PlanInput,
            models::market::UserSubscription, models::market::SubscribeRequest,
            models::market::UpdateSubscriptionRequest, models::market::MarketPrice,
            models::market::PriceInput, models::market::PriceAlert, models::market::AlertInput,
            models::market::MarketSummary, models::market::RealtimeSnapshot,
            models::market::DailyAnalytics, models::market::MarketAnalytics,
        )
    ),
    tags(
        (name = "gcx-cms", description = "GCX website CMS and market-data API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// Shared, cheaply clonable container for the services every handler draws on.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub storage: StorageState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the route groups, serves stored uploads, and wraps everything in the
/// request-id, tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");
    let uploads = ServeDir::new(&state.config.upload_dir);

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(authenticated::authenticated_routes(state.clone()))
        .merge(cms::cms_routes(state.clone()))
        .merge(admin::admin_routes(state.clone()))
        // GET /uploads/images/<name>
        .nest_service("/uploads", uploads)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` set by the layer above
/// so every log line of one request can be correlated.
fn trace_span_logger(request: &Request) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
