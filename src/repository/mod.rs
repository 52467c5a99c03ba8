use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    ActivityItem, BlogPost, ContentFilter, ContentKind, CreateSettingRequest, DashboardStats,
    Menu, MenuInput, MenuItem, MenuItemInput, NewUser, Page, Paginated, Setting,
    SettingBatchItem, SettingQuery, UpdateProfileRequest, UpdateSettingRequest,
    UpdateUserAccessRequest, User, UserQuery,
    directory::{
        BoardMember, BoardMemberInput, Broker, BrokerInput, Career, CareerInput, Commodity,
        CommodityInput, DirectoryFilter, Partner, PartnerInput, Publication, PublicationInput,
        ReorderEntry, TeamMember, TeamMemberInput, Trader, TraderInput,
    },
    market::{
        AlertInput, DailyAnalytics, MarketPrice, NewSubscription, PlanInput, PriceAlert,
        PriceInput, SubscriptionPlan, UpdateSubscriptionRequest, UserSubscription,
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

pub type RepoResult<T> = Result<T, RepoError>;

/// RepositoryState
///
/// The store as shared through `AppState`. Either backend can sit behind it.
pub type RepositoryState = Arc<dyn Repository>;

/// Names of the uniqueness rules, shared by the SQL schema and the in-memory store.
pub mod constraints {
    pub const USER_EMAIL: &str = "users_email_key";
    pub const PAGE_SLUG: &str = "pages_slug_key";
    pub const POST_SLUG: &str = "blog_posts_slug_key";
    pub const SETTING_KEY: &str = "settings_key_key";
    pub const SETTING_TYPE: &str = "settings_type_check";
    pub const COMMODITY_CODE: &str = "commodities_code_key";
    pub const ACTIVE_SUBSCRIPTION: &str = "user_subscriptions_one_active";
    /// Subscriptions keep their plan alive.
    pub const SUBSCRIPTION_PLAN: &str = "user_subscriptions_plan_id_fkey";
}

/// RepoError
///
/// Store failures, classified so the HTTP layer can pick a status without
/// inspecting driver errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("record not found")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Constraint(String),
    #[error("database error: {0}")]
    Database(sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl RepoError {
    /// Conflict for the named uniqueness rule, with a message fit for clients.
    pub fn conflict(constraint: &str) -> Self {
        let message = match constraint {
            constraints::USER_EMAIL => "Email already registered",
            constraints::PAGE_SLUG | constraints::POST_SLUG => "Slug already in use",
            constraints::SETTING_KEY => "Setting key already exists",
            constraints::COMMODITY_CODE => "Commodity code already exists",
            constraints::ACTIVE_SUBSCRIPTION => "User already has an active subscription",
            _ => "Record already exists",
        };
        RepoError::Conflict(message.to_string())
    }

    pub fn check_failed(constraint: &str) -> Self {
        let message = match constraint {
            constraints::SETTING_TYPE => "Invalid setting type",
            constraints::SUBSCRIPTION_PLAN => "Plan has subscriptions; deactivate it instead",
            _ => "Constraint violated",
        };
        RepoError::Constraint(message.to_string())
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return RepoError::NotFound;
        }
        if let Some(db) = err.as_database_error() {
            let constraint = db.constraint().unwrap_or_default().to_string();
            if db.is_unique_violation() {
                return RepoError::conflict(&constraint);
            }
            if db.is_check_violation() {
                return RepoError::check_failed(&constraint);
            }
            if db.is_foreign_key_violation() {
                return RepoError::Constraint("Referenced record does not exist".to_string());
            }
        }
        RepoError::Database(err)
    }
}

/// UserRepository
///
/// Accounts and credentials.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, id: i64) -> RepoResult<Option<User>>;
    /// Lookup by normalized email.
    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    /// Fails with `Conflict` when the email is taken.
    async fn create_user(&self, user: NewUser) -> RepoResult<User>;
    async fn update_profile(&self, id: i64, changes: &UpdateProfileRequest)
    -> RepoResult<Option<User>>;
    async fn set_password_hash(&self, id: i64, password_hash: &str) -> RepoResult<bool>;
    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> RepoResult<()>;
    async fn list_users(&self, query: &UserQuery) -> RepoResult<Paginated<User>>;
    async fn update_user_access(
        &self,
        id: i64,
        changes: &UpdateUserAccessRequest,
    ) -> RepoResult<Option<User>>;
    async fn count_admins(&self) -> RepoResult<i64>;
}

/// ContentRepository
///
/// Pages and blog posts. Lifecycle and slug rules are applied before records get
/// here; the store persists whole records.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Whether `slug` is taken in the given namespace, ignoring record `exclude_id`.
    /// Soft-deleted pages still hold their slug.
    async fn slug_exists(
        &self,
        kind: ContentKind,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> RepoResult<bool>;

    async fn list_pages(&self, filter: &ContentFilter) -> RepoResult<Paginated<Page>>;
    async fn get_page(&self, id: i64) -> RepoResult<Option<Page>>;
    async fn get_page_by_slug(&self, slug: &str) -> RepoResult<Option<Page>>;
    async fn insert_page(&self, page: &Page) -> RepoResult<Page>;
    async fn update_page(&self, page: &Page) -> RepoResult<Option<Page>>;
    async fn soft_delete_page(&self, id: i64, at: DateTime<Utc>) -> RepoResult<bool>;

    async fn list_posts(&self, filter: &ContentFilter) -> RepoResult<Paginated<BlogPost>>;
    async fn get_post(&self, id: i64) -> RepoResult<Option<BlogPost>>;
    async fn get_post_by_slug(&self, slug: &str) -> RepoResult<Option<BlogPost>>;
    async fn insert_post(&self, post: &BlogPost) -> RepoResult<BlogPost>;
    async fn update_post(&self, post: &BlogPost) -> RepoResult<Option<BlogPost>>;
    async fn delete_post(&self, id: i64) -> RepoResult<bool>;

    /// Counters for the dashboard; `media_files` is left at zero for the caller to fill.
    async fn content_stats(&self, author_id: Option<i64>) -> RepoResult<DashboardStats>;
    async fn recent_activity(
        &self,
        author_id: Option<i64>,
        limit: i64,
    ) -> RepoResult<Vec<ActivityItem>>;
}

/// SettingRepository
///
/// Site settings keyed by their immutable key.
#[async_trait]
pub trait SettingRepository: Send + Sync {
    /// Ordered by group, sort order, then key.
    async fn list_settings(&self, query: &SettingQuery) -> RepoResult<Vec<Setting>>;
    async fn get_setting(&self, key: &str) -> RepoResult<Option<Setting>>;
    async fn create_setting(&self, setting: &CreateSettingRequest) -> RepoResult<Setting>;
    async fn update_setting(
        &self,
        key: &str,
        changes: &UpdateSettingRequest,
    ) -> RepoResult<Option<Setting>>;
    /// Applies every item in one transaction. Unknown keys are skipped; any failure
    /// rolls back the whole batch. Returns the number of rows changed.
    async fn update_settings_batch(&self, items: &[SettingBatchItem]) -> RepoResult<u64>;
    async fn delete_setting(&self, key: &str) -> RepoResult<bool>;
}

/// MenuRepository
///
/// Navigation menus and their items. Menus are returned with nested items.
#[async_trait]
pub trait MenuRepository: Send + Sync {
    async fn list_menus(&self) -> RepoResult<Vec<Menu>>;
    async fn get_menu(&self, id: i64) -> RepoResult<Option<Menu>>;
    /// The active menu at `location`, carrying only active items.
    async fn find_active_menu(&self, location: &str) -> RepoResult<Option<Menu>>;
    async fn create_menu(&self, menu: &MenuInput) -> RepoResult<Menu>;
    async fn update_menu(&self, id: i64, menu: &MenuInput) -> RepoResult<Option<Menu>>;
    /// Removes the menu together with its items.
    async fn delete_menu(&self, id: i64) -> RepoResult<bool>;
    /// Flat, ordered by sort order.
    async fn list_menu_items(&self, menu_id: i64) -> RepoResult<Vec<MenuItem>>;
    async fn create_menu_item(&self, menu_id: i64, item: &MenuItemInput)
    -> RepoResult<MenuItem>;
    async fn update_menu_item(&self, id: i64, item: &MenuItemInput)
    -> RepoResult<Option<MenuItem>>;
    async fn delete_menu_item(&self, id: i64) -> RepoResult<bool>;
}

/// DirectoryRepository
///
/// Listing records edited from the CMS. Updates replace every editable field.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    async fn list_team_members(&self, filter: &DirectoryFilter)
    -> RepoResult<Paginated<TeamMember>>;
    async fn get_team_member(&self, id: i64) -> RepoResult<Option<TeamMember>>;
    /// Without an explicit order index the member goes after the last one of its type.
    async fn create_team_member(&self, input: &TeamMemberInput) -> RepoResult<TeamMember>;
    async fn update_team_member(
        &self,
        id: i64,
        input: &TeamMemberInput,
    ) -> RepoResult<Option<TeamMember>>;
    async fn delete_team_member(&self, id: i64) -> RepoResult<bool>;
    /// All-or-nothing; an unknown id fails the whole reorder with `NotFound`.
    async fn reorder_team_members(&self, entries: &[ReorderEntry]) -> RepoResult<()>;

    async fn list_board_members(
        &self,
        filter: &DirectoryFilter,
    ) -> RepoResult<Paginated<BoardMember>>;
    async fn get_board_member(&self, id: i64) -> RepoResult<Option<BoardMember>>;
    async fn create_board_member(&self, input: &BoardMemberInput) -> RepoResult<BoardMember>;
    async fn update_board_member(
        &self,
        id: i64,
        input: &BoardMemberInput,
    ) -> RepoResult<Option<BoardMember>>;
    async fn delete_board_member(&self, id: i64) -> RepoResult<bool>;
    async fn reorder_board_members(&self, entries: &[ReorderEntry]) -> RepoResult<()>;

    async fn list_traders(&self, filter: &DirectoryFilter) -> RepoResult<Paginated<Trader>>;
    async fn get_trader(&self, id: i64) -> RepoResult<Option<Trader>>;
    async fn create_trader(&self, input: &TraderInput) -> RepoResult<Trader>;
    async fn update_trader(&self, id: i64, input: &TraderInput) -> RepoResult<Option<Trader>>;
    async fn delete_trader(&self, id: i64) -> RepoResult<bool>;

    async fn list_brokers(&self, filter: &DirectoryFilter) -> RepoResult<Paginated<Broker>>;
    async fn get_broker(&self, id: i64) -> RepoResult<Option<Broker>>;
    async fn create_broker(&self, input: &BrokerInput) -> RepoResult<Broker>;
    async fn update_broker(&self, id: i64, input: &BrokerInput) -> RepoResult<Option<Broker>>;
    async fn delete_broker(&self, id: i64) -> RepoResult<bool>;

    async fn list_partners(&self, filter: &DirectoryFilter) -> RepoResult<Paginated<Partner>>;
    async fn get_partner(&self, id: i64) -> RepoResult<Option<Partner>>;
    async fn create_partner(&self, input: &PartnerInput) -> RepoResult<Partner>;
    async fn update_partner(&self, id: i64, input: &PartnerInput)
    -> RepoResult<Option<Partner>>;
    async fn delete_partner(&self, id: i64) -> RepoResult<bool>;

    async fn list_publications(
        &self,
        filter: &DirectoryFilter,
    ) -> RepoResult<Paginated<Publication>>;
    async fn get_publication(&self, id: i64) -> RepoResult<Option<Publication>>;
    async fn create_publication(&self, input: &PublicationInput) -> RepoResult<Publication>;
    async fn update_publication(
        &self,
        id: i64,
        input: &PublicationInput,
    ) -> RepoResult<Option<Publication>>;
    async fn delete_publication(&self, id: i64) -> RepoResult<bool>;

    async fn list_careers(&self, filter: &DirectoryFilter) -> RepoResult<Paginated<Career>>;
    async fn get_career(&self, id: i64) -> RepoResult<Option<Career>>;
    async fn create_career(&self, input: &CareerInput) -> RepoResult<Career>;
    async fn update_career(&self, id: i64, input: &CareerInput) -> RepoResult<Option<Career>>;
    async fn delete_career(&self, id: i64) -> RepoResult<bool>;

    async fn list_commodities(
        &self,
        filter: &DirectoryFilter,
        active_only: bool,
    ) -> RepoResult<Paginated<Commodity>>;
    async fn get_commodity(&self, id: i64) -> RepoResult<Option<Commodity>>;
    /// Fails with `Conflict` when the code is taken.
    async fn create_commodity(&self, input: &CommodityInput) -> RepoResult<Commodity>;
    async fn update_commodity(
        &self,
        id: i64,
        input: &CommodityInput,
    ) -> RepoResult<Option<Commodity>>;
    async fn delete_commodity(&self, id: i64) -> RepoResult<bool>;
}

/// MarketRepository
///
/// Subscription plans, user subscriptions, price observations and alerts.
#[async_trait]
pub trait MarketRepository: Send + Sync {
    /// Ordered by sort order, then price.
    async fn list_plans(&self, active_only: bool) -> RepoResult<Vec<SubscriptionPlan>>;
    async fn get_plan(&self, id: i64) -> RepoResult<Option<SubscriptionPlan>>;
    async fn create_plan(&self, input: &PlanInput) -> RepoResult<SubscriptionPlan>;
    async fn update_plan(&self, id: i64, input: &PlanInput)
    -> RepoResult<Option<SubscriptionPlan>>;
    async fn delete_plan(&self, id: i64) -> RepoResult<bool>;

    async fn active_subscription(&self, user_id: i64) -> RepoResult<Option<UserSubscription>>;
    /// Fails with `Conflict` when the user already holds an active subscription.
    async fn create_subscription(&self, new: &NewSubscription) -> RepoResult<UserSubscription>;
    async fn get_subscription(&self, id: i64) -> RepoResult<Option<UserSubscription>>;
    async fn update_subscription(
        &self,
        id: i64,
        changes: &UpdateSubscriptionRequest,
    ) -> RepoResult<Option<UserSubscription>>;
    /// Marks the subscription cancelled and switches auto-renew off.
    async fn cancel_subscription(&self, id: i64) -> RepoResult<Option<UserSubscription>>;

    /// Most recent observation per commodity, ordered by commodity.
    async fn latest_prices(&self) -> RepoResult<Vec<MarketPrice>>;
    /// Observations inside `[start, end]`, oldest first.
    async fn prices_between(
        &self,
        commodity: Option<&str>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Vec<MarketPrice>>;
    /// One aggregate per UTC day of `commodity` inside `[start, end]`, oldest first.
    async fn daily_analytics(
        &self,
        commodity: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Vec<DailyAnalytics>>;
    async fn create_price(&self, input: &PriceInput) -> RepoResult<MarketPrice>;
    async fn update_price(&self, id: i64, input: &PriceInput) -> RepoResult<Option<MarketPrice>>;
    async fn delete_price(&self, id: i64) -> RepoResult<bool>;

    async fn list_alerts(&self, user_id: i64) -> RepoResult<Vec<PriceAlert>>;
    async fn get_alert(&self, id: i64) -> RepoResult<Option<PriceAlert>>;
    async fn create_alert(&self, user_id: i64, input: &AlertInput) -> RepoResult<PriceAlert>;
    async fn update_alert(&self, id: i64, input: &AlertInput) -> RepoResult<Option<PriceAlert>>;
    async fn delete_alert(&self, id: i64) -> RepoResult<bool>;
}

/// Repository
///
/// Everything the HTTP layer needs from the store, as one trait object.
pub trait Repository:
    UserRepository
    + ContentRepository
    + SettingRepository
    + MenuRepository
    + DirectoryRepository
    + MarketRepository
{
}

impl<T> Repository for T where
    T: UserRepository
        + ContentRepository
        + SettingRepository
        + MenuRepository
        + DirectoryRepository
        + MarketRepository
{
}
