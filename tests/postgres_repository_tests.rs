//! Store tests against a live Postgres. They run only when `DATABASE_URL` is set
//! and share that database, so every record carries a per-test run tag.

mod common;

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{Duration, TimeZone, Utc};
use common::seed_user;
use gcx_cms::{
    AppConfig, AppState, MockStorageService, PostgresRepository,
    auth::AuthUser,
    extract::JsonBody,
    handlers::pages,
    models::{
        ContentQuery, CreatePageRequest, CreateSettingRequest, NewUser, Page, Role,
        SettingBatchItem,
        directory::CommodityInput,
        market::PriceInput,
    },
    repository::{
        DirectoryRepository, MarketRepository, RepoError, SettingRepository, UserRepository,
    },
};
use serial_test::serial;
use sqlx::PgPool;

// --- Test Context and Setup ---

struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    /// `None` when no database is configured; the calling test then returns early.
    async fn setup() -> Option<Self> {
        dotenv::dotenv().ok();

        let Ok(db_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping Postgres store test");
            return None;
        };

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        Some(DbTestContext { pool })
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }

    fn state(&self) -> AppState {
        AppState {
            repo: Arc::new(self.repository()),
            storage: Arc::new(MockStorageService::new()),
            config: AppConfig::default(),
        }
    }
}

// --- Test Data Helpers ---

/// Short lowercase tag that keeps keys, slugs and emails apart between runs.
fn run_tag() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..10].to_string()
}

async fn create_page(state: &AppState, author: &AuthUser, title: &str) -> Page {
    let (status, Json(page)) = pages::create_page(
        author.clone(),
        State(state.clone()),
        JsonBody(CreatePageRequest {
            title: title.to_string(),
            content: "<p>Body</p>".to_string(),
            ..Default::default()
        }),
    )
    .await
    .expect("page created");
    assert_eq!(status, StatusCode::CREATED);
    page
}

fn setting(key: &str, value: &str) -> CreateSettingRequest {
    CreateSettingRequest {
        key: key.to_string(),
        value: value.to_string(),
        setting_type: "string".to_string(),
        group: "general".to_string(),
        label: String::new(),
        description: String::new(),
        is_public: false,
        sort_order: 0,
    }
}

// --- Settings ---

#[tokio::test]
#[serial(postgres)]
async fn test_pg_settings_batch_applies_metadata_or_rolls_back() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let tag = run_tag();
    let name_key = format!("site_name_{tag}");
    let email_key = format!("site_email_{tag}");
    repo.create_setting(&setting(&name_key, "GCX")).await.unwrap();
    repo.create_setting(&setting(&email_key, "info@gcx.com.gh"))
        .await
        .unwrap();

    let err = repo
        .update_settings_batch(&[
            SettingBatchItem {
                key: name_key.clone(),
                value: "Changed".to_string(),
                group: Some("hero".to_string()),
                ..Default::default()
            },
            SettingBatchItem {
                key: email_key.clone(),
                value: "changed@gcx.test".to_string(),
                setting_type: Some("binary".to_string()),
                ..Default::default()
            },
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Constraint(ref message) if message == "Invalid setting type"));

    let untouched = repo.get_setting(&name_key).await.unwrap().expect("setting");
    assert_eq!(untouched.value, "GCX");
    assert_eq!(untouched.group, "general");

    let updated = repo
        .update_settings_batch(&[
            SettingBatchItem {
                key: name_key.clone(),
                value: "Ghana Commodity Exchange".to_string(),
                group: Some("hero".to_string()),
                label: Some("Site name".to_string()),
                is_public: Some(true),
                sort_order: Some(2),
                ..Default::default()
            },
            SettingBatchItem {
                key: format!("missing_{tag}"),
                value: "ignored".to_string(),
                ..Default::default()
            },
        ])
        .await
        .unwrap();
    assert_eq!(updated, 1);

    let moved = repo.get_setting(&name_key).await.unwrap().expect("setting");
    assert_eq!(moved.value, "Ghana Commodity Exchange");
    assert_eq!(moved.group, "hero");
    assert_eq!(moved.label, "Site name");
    assert!(moved.is_public);
    assert_eq!(moved.sort_order, 2);
    // Fields the entry left out keep their stored value.
    assert_eq!(moved.setting_type, "string");

    let err = repo.create_setting(&setting(&name_key, "again")).await.unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));
}

// --- Pages ---

#[tokio::test]
#[serial(postgres)]
async fn test_pg_page_slugs_collide_and_soft_delete_keeps_them() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let state = ctx.state();
    let tag = run_tag();
    let author = seed_user(&state, Role::Blogger, &format!("author-{tag}@gcx.test")).await;
    let title = format!("Launch {tag}");

    let first = create_page(&state, &author, &title).await;
    let second = create_page(&state, &author, &title).await;
    assert_eq!(first.slug, format!("launch-{tag}"));
    assert_eq!(second.slug, format!("launch-{tag}-1"));

    let Json(message) = pages::delete_page(author.clone(), State(state.clone()), Path(first.id))
        .await
        .unwrap();
    assert_eq!(message.message, "Page deleted successfully");

    let err = pages::get_page(author.clone(), State(state.clone()), Path(first.id))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

    let Json(listed) = pages::list_pages(
        author.clone(),
        State(state.clone()),
        Query(ContentQuery {
            search: Some(tag.clone()),
            ..Default::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(listed.pagination.total, 1);
    assert_eq!(listed.data[0].id, second.id);

    let third = create_page(&state, &author, &title).await;
    assert_eq!(third.slug, format!("launch-{tag}-2"));
}

#[tokio::test]
#[serial(postgres)]
async fn test_pg_page_listing_is_scoped_to_author() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let state = ctx.state();
    let tag = run_tag();
    let first = seed_user(&state, Role::Blogger, &format!("first-{tag}@gcx.test")).await;
    let second = seed_user(&state, Role::Blogger, &format!("second-{tag}@gcx.test")).await;
    let admin = seed_user(&state, Role::Admin, &format!("admin-{tag}@gcx.test")).await;
    create_page(&state, &first, &format!("One {tag}")).await;
    create_page(&state, &second, &format!("Two {tag}")).await;

    let query = || {
        Query(ContentQuery {
            search: Some(tag.clone()),
            ..Default::default()
        })
    };

    let Json(own) = pages::list_pages(first, State(state.clone()), query())
        .await
        .unwrap();
    assert_eq!(own.pagination.total, 1);
    assert_eq!(own.data[0].title, format!("One {tag}"));

    let Json(all) = pages::list_pages(admin, State(state), query()).await.unwrap();
    assert_eq!(all.pagination.total, 2);
}

// --- Uniqueness ---

#[tokio::test]
#[serial(postgres)]
async fn test_pg_duplicate_email_and_commodity_code_conflict() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let tag = run_tag();
    let new_user = || NewUser {
        name: "Ama".to_string(),
        email: format!("ama-{tag}@gcx.test"),
        password_hash: "not-a-real-hash".to_string(),
        role: Role::User,
        is_active: true,
    };

    repo.create_user(new_user()).await.unwrap();
    let err = repo.create_user(new_user()).await.unwrap_err();
    assert!(matches!(err, RepoError::Conflict(ref message) if message == "Email already registered"));

    let commodity: CommodityInput = serde_json::from_value(serde_json::json!({
        "name": "Maize",
        "code": format!("GMAZ-{tag}"),
        "current_price": 110.0,
        "previous_price": 100.0,
    }))
    .expect("commodity input");
    let created = repo.create_commodity(&commodity).await.unwrap();
    assert!((created.change_percent - 10.0).abs() < 1e-9);

    let err = repo.create_commodity(&commodity).await.unwrap_err();
    assert!(
        matches!(err, RepoError::Conflict(ref message) if message == "Commodity code already exists")
    );
}

// --- Market ---

#[tokio::test]
#[serial(postgres)]
async fn test_pg_daily_analytics_groups_by_day() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let commodity = format!("Maize {}", run_tag());
    let day = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    for (hours, price, volume) in [(9, 100.0, 10.0), (15, 104.0, 5.0), (33, 103.5, 2.0)] {
        let input: PriceInput = serde_json::from_value(serde_json::json!({
            "commodity": commodity,
            "price": price,
            "volume": volume,
            "market_date": day + Duration::hours(hours),
        }))
        .expect("price input");
        repo.create_price(&input).await.unwrap();
    }

    let days = repo
        .daily_analytics(&commodity, day, day + Duration::days(2))
        .await
        .unwrap();

    assert_eq!(days.len(), 2);
    assert_eq!(days[0].date.to_string(), "2026-03-01");
    assert_eq!(days[0].open_price, 100.0);
    assert_eq!(days[0].close_price, 104.0);
    assert_eq!(days[0].total_volume, 15.0);
    assert_eq!(days[0].transaction_count, 2);
    assert_eq!(days[0].market_sentiment, "bullish");
    assert_eq!(days[1].transaction_count, 1);
    assert_eq!(days[1].market_sentiment, "neutral");
}
