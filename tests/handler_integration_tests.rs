mod common;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use common::{PASSWORD, seed_user, test_state};
use gcx_cms::{
    AppState,
    auth::AuthUser,
    extract::JsonBody,
    handlers::{auth, market, menus, pages, posts, settings, users},
    models::{
        BatchUpdateRequest, ContentQuery, ContentStatus, CreatePageRequest, CreatePostRequest,
        CreateSettingRequest, LoginRequest, MenuInput, MenuItemInput, RegisterRequest, Role,
        Setting, SettingBatchItem, UpdatePageRequest, UpdateUserAccessRequest,
        market::{AnalyticsQuery, PlanInput, PriceInput, SubscribeRequest, subscription_status},
    },
};

async fn create_page(state: &AppState, author: &AuthUser, title: &str) -> gcx_cms::models::Page {
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
        is_public: true,
        sort_order: 0,
    }
}

async fn store_setting(state: &AppState, payload: CreateSettingRequest) -> Setting {
    let (status, Json(stored)) = settings::create_setting(State(state.clone()), JsonBody(payload))
        .await
        .expect("setting created");
    assert_eq!(status, StatusCode::CREATED);
    stored
}

fn plan(name: &str, price: f64) -> PlanInput {
    PlanInput {
        name: name.to_string(),
        description: String::new(),
        price,
        currency: "GHS".to_string(),
        duration_days: 30,
        features: vec!["prices".to_string()],
        max_users: 1,
        is_active: true,
        sort_order: 0,
    }
}

// --- Pages ---

#[tokio::test]
async fn test_page_slugs_are_generated_and_deduplicated() {
    let state = test_state();
    let author = seed_user(&state, Role::Blogger, "writer@gcx.test").await;

    let first = create_page(&state, &author, "About Us!").await;
    let second = create_page(&state, &author, "About Us").await;
    let third = create_page(&state, &author, "About   Us").await;

    assert_eq!(first.slug, "about-us");
    assert_eq!(second.slug, "about-us-1");
    assert_eq!(third.slug, "about---us");
    assert_eq!(first.template, "default");
    assert_eq!(first.status, ContentStatus::Draft);
    assert!(first.published_at.is_none());
}

#[tokio::test]
async fn test_pages_and_posts_have_separate_slug_namespaces() {
    let state = test_state();
    let author = seed_user(&state, Role::Blogger, "writer@gcx.test").await;

    create_page(&state, &author, "Market News").await;
    let (_, Json(post)) = posts::create_post(
        author.clone(),
        State(state.clone()),
        JsonBody(CreatePostRequest {
            title: "Market News".to_string(),
            content: "Prices rose.".to_string(),
            excerpt: "Prices rose.".to_string(),
            tags: vec![" maize ".to_string(), "maize".to_string(), String::new()],
            ..Default::default()
        }),
    )
    .await
    .unwrap();

    assert_eq!(post.slug, "market-news");
    assert_eq!(post.tags, vec!["maize".to_string()]);
}

#[tokio::test]
async fn test_non_owner_cannot_touch_page_but_admin_can() {
    let state = test_state();
    let author = seed_user(&state, Role::Blogger, "author@gcx.test").await;
    let other = seed_user(&state, Role::Blogger, "other@gcx.test").await;
    let admin = seed_user(&state, Role::Admin, "admin@gcx.test").await;
    let page = create_page(&state, &author, "Owned").await;

    let err = pages::get_page(other.clone(), State(state.clone()), Path(page.id))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

    let err = pages::delete_page(other, State(state.clone()), Path(page.id))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

    let Json(seen) = pages::get_page(admin, State(state.clone()), Path(page.id))
        .await
        .unwrap();
    assert_eq!(seen.author_id, author.id);
}

#[tokio::test]
async fn test_listing_is_scoped_to_author_for_non_admins() {
    let state = test_state();
    let first = seed_user(&state, Role::Blogger, "first@gcx.test").await;
    let second = seed_user(&state, Role::Blogger, "second@gcx.test").await;
    let admin = seed_user(&state, Role::Admin, "admin@gcx.test").await;
    create_page(&state, &first, "One").await;
    create_page(&state, &second, "Two").await;

    let Json(own) = pages::list_pages(first, State(state.clone()), Query(ContentQuery::default()))
        .await
        .unwrap();
    assert_eq!(own.pagination.total, 1);
    assert_eq!(own.data[0].title, "One");

    let Json(all) = pages::list_pages(admin, State(state.clone()), Query(ContentQuery::default()))
        .await
        .unwrap();
    assert_eq!(all.pagination.total, 2);
}

#[tokio::test]
async fn test_publish_then_unpublish_page() {
    let state = test_state();
    let author = seed_user(&state, Role::Blogger, "author@gcx.test").await;
    let page = create_page(&state, &author, "Launch").await;

    let Json(published) = pages::update_page(
        author.clone(),
        State(state.clone()),
        Path(page.id),
        JsonBody(UpdatePageRequest {
            status: Some(ContentStatus::Published),
            ..Default::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(published.status, ContentStatus::Published);
    let first_published_at = published.published_at.expect("timestamp set on publish");

    let Json(public) = pages::get_public_page(State(state.clone()), Path("launch".to_string()))
        .await
        .unwrap();
    assert_eq!(public.id, page.id);

    // Re-publishing keeps the original timestamp.
    let Json(again) = pages::update_page(
        author.clone(),
        State(state.clone()),
        Path(page.id),
        JsonBody(UpdatePageRequest {
            status: Some(ContentStatus::Published),
            ..Default::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(again.published_at, Some(first_published_at));

    let Json(draft) = pages::update_page(
        author,
        State(state.clone()),
        Path(page.id),
        JsonBody(UpdatePageRequest {
            status: Some(ContentStatus::Draft),
            ..Default::default()
        }),
    )
    .await
    .unwrap();
    assert!(draft.published_at.is_none());

    let err = pages::get_public_page(State(state), Path("launch".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleted_page_keeps_its_slug_reserved() {
    let state = test_state();
    let author = seed_user(&state, Role::Blogger, "author@gcx.test").await;
    let page = create_page(&state, &author, "Careers").await;

    let Json(message) = pages::delete_page(author.clone(), State(state.clone()), Path(page.id))
        .await
        .unwrap();
    assert_eq!(message.message, "Page deleted successfully");

    let err = pages::get_page(author.clone(), State(state.clone()), Path(page.id))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

    let replacement = create_page(&state, &author, "Careers").await;
    assert_eq!(replacement.slug, "careers-1");
}

#[tokio::test]
async fn test_page_cannot_be_its_own_parent() {
    let state = test_state();
    let author = seed_user(&state, Role::Admin, "admin@gcx.test").await;
    let page = create_page(&state, &author, "Loop").await;

    let err = pages::update_page(
        author,
        State(state),
        Path(page.id),
        JsonBody(UpdatePageRequest {
            parent_id: Some(page.id),
            ..Default::default()
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

// --- Settings ---

#[tokio::test]
async fn test_duplicate_setting_key_conflicts() {
    let state = test_state();
    store_setting(&state, setting("site_name", "GCX")).await;

    let err = settings::create_setting(State(state.clone()), JsonBody(setting("site_name", "x")))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::CONFLICT);

    let mut bogus = setting("logo", "x");
    bogus.setting_type = "binary".to_string();
    let err = settings::create_setting(State(state), JsonBody(bogus))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_batch_skips_unknown_keys() {
    let state = test_state();
    store_setting(&state, setting("site_name", "GCX")).await;

    let Json(response) = settings::update_settings_batch(
        State(state.clone()),
        JsonBody(BatchUpdateRequest::Items(vec![
            SettingBatchItem {
                key: "site_name".to_string(),
                value: "Ghana Commodity Exchange".to_string(),
                ..Default::default()
            },
            SettingBatchItem {
                key: "does_not_exist".to_string(),
                value: "ignored".to_string(),
                ..Default::default()
            },
        ])),
    )
    .await
    .unwrap();

    assert_eq!(response.message, "Settings updated successfully");
    assert_eq!(response.updated, 1);

    let Json(stored) = settings::get_setting(State(state), Path("site_name".to_string()))
        .await
        .unwrap();
    assert_eq!(stored.value, "Ghana Commodity Exchange");
    // Metadata the entry left out is untouched.
    assert_eq!(stored.group, "general");
    assert!(stored.is_public);
}

#[tokio::test]
async fn test_batch_updates_metadata_and_moves_group() {
    let state = test_state();
    let mut headline = setting("hero_title", "Old headline");
    headline.is_public = false;
    store_setting(&state, headline).await;

    let Json(before) = settings::get_public_group(State(state.clone()), Path("hero".to_string()))
        .await
        .unwrap();
    assert!(before.settings.is_empty());

    let Json(response) = settings::update_settings_batch(
        State(state.clone()),
        JsonBody(BatchUpdateRequest::Items(vec![SettingBatchItem {
            key: "hero_title".to_string(),
            value: "Trade with confidence".to_string(),
            setting_type: Some("text".to_string()),
            group: Some("hero".to_string()),
            label: Some("Hero title".to_string()),
            description: Some("Headline on the home page".to_string()),
            is_public: Some(true),
            sort_order: Some(3),
        }])),
    )
    .await
    .unwrap();
    assert_eq!(response.updated, 1);

    let Json(stored) = settings::get_setting(State(state.clone()), Path("hero_title".to_string()))
        .await
        .unwrap();
    assert_eq!(stored.setting_type, "text");
    assert_eq!(stored.group, "hero");
    assert_eq!(stored.label, "Hero title");
    assert_eq!(stored.description, "Headline on the home page");
    assert!(stored.is_public);
    assert_eq!(stored.sort_order, 3);

    let Json(after) = settings::get_public_group(State(state), Path("hero".to_string()))
        .await
        .unwrap();
    assert_eq!(
        after.settings.get("hero_title").map(String::as_str),
        Some("Trade with confidence")
    );
}

#[tokio::test]
async fn test_batch_with_invalid_type_writes_nothing() {
    let state = test_state();
    for (key, value) in [("site_name", "GCX"), ("site_email", "info@gcx.com.gh")] {
        store_setting(&state, setting(key, value)).await;
    }

    let err = settings::update_settings_batch(
        State(state.clone()),
        JsonBody(BatchUpdateRequest::Wrapped {
            settings: vec![
                SettingBatchItem {
                    key: "site_name".to_string(),
                    value: "Changed".to_string(),
                    group: Some("branding".to_string()),
                    ..Default::default()
                },
                SettingBatchItem {
                    key: "site_email".to_string(),
                    value: "changed@gcx.test".to_string(),
                    setting_type: Some("binary".to_string()),
                    ..Default::default()
                },
            ],
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

    let Json(name) = settings::get_setting(State(state), Path("site_name".to_string()))
        .await
        .unwrap();
    assert_eq!(name.value, "GCX");
    assert_eq!(name.group, "general");
}

#[tokio::test]
async fn test_public_settings_hide_private_entries() {
    let state = test_state();
    let mut hero = setting("hero_title", "Trade with confidence");
    hero.group = "hero".to_string();
    let mut secret = setting("smtp_password", "hunter2");
    secret.is_public = false;
    for payload in [hero, secret, setting("site_name", "GCX")] {
        store_setting(&state, payload).await;
    }

    let Json(all) = settings::get_public_settings(State(state.clone())).await.unwrap();
    assert_eq!(all.settings.len(), 2);
    assert!(!all.settings.contains_key("smtp_password"));

    let Json(group) = settings::get_public_group(State(state), Path("hero".to_string()))
        .await
        .unwrap();
    assert_eq!(
        group.settings.get("hero_title").map(String::as_str),
        Some("Trade with confidence")
    );
    assert_eq!(group.settings.len(), 1);
}

// --- Menus ---

#[tokio::test]
async fn test_menu_item_parent_must_belong_to_same_menu() {
    let state = test_state();
    let item = |label: &str, parent_id: Option<i64>| MenuItemInput {
        label: label.to_string(),
        url: format!("/{}", label.to_lowercase()),
        target: "_self".to_string(),
        icon_class: None,
        parent_id,
        sort_order: 0,
        is_active: true,
    };

    let (_, Json(header)) = menus::create_menu(
        State(state.clone()),
        JsonBody(MenuInput {
            name: "Main".to_string(),
            location: "header".to_string(),
            is_active: true,
        }),
    )
    .await
    .unwrap();
    let (_, Json(footer)) = menus::create_menu(
        State(state.clone()),
        JsonBody(MenuInput {
            name: "Footer".to_string(),
            location: "footer".to_string(),
            is_active: true,
        }),
    )
    .await
    .unwrap();

    let (_, Json(about)) = menus::create_menu_item(
        State(state.clone()),
        Path(header.id),
        JsonBody(item("About", None)),
    )
    .await
    .unwrap();
    let (_, Json(team)) = menus::create_menu_item(
        State(state.clone()),
        Path(header.id),
        JsonBody(item("Team", Some(about.id))),
    )
    .await
    .unwrap();
    assert_eq!(team.parent_id, Some(about.id));

    let err = menus::create_menu_item(
        State(state.clone()),
        Path(footer.id),
        JsonBody(item("Stray", Some(about.id))),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(err.to_string(), "Parent menu item not found");

    let Json(public) = menus::get_menu_by_location(State(state), Path("header".to_string()))
        .await
        .unwrap();
    assert_eq!(public.items.len(), 1);
    assert_eq!(public.items[0].children[0].label, "Team");
}

// --- Accounts ---

#[tokio::test]
async fn test_register_validates_and_rejects_duplicates() {
    let state = test_state();
    let request = |email: &str, password: &str| RegisterRequest {
        name: "Ama Mensah".to_string(),
        email: email.to_string(),
        password: password.to_string(),
    };

    let err = auth::register(State(state.clone()), JsonBody(request("not-an-email", "secret1")))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

    let err = auth::register(State(state.clone()), JsonBody(request("ama@gcx.test", "short")))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

    let (status, Json(created)) =
        auth::register(State(state.clone()), JsonBody(request("Ama@GCX.test", "secret1")))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.user.role, Role::User);
    assert_eq!(created.user.email, "ama@gcx.test");
    assert!(!created.token.is_empty());

    let err = auth::register(State(state), JsonBody(request("ama@gcx.test", "secret1")))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::CONFLICT);
    assert_eq!(err.to_string(), "Email already registered");
}

#[tokio::test]
async fn test_login_records_last_login_and_hides_failure_reason() {
    let state = test_state();
    seed_user(&state, Role::Trader, "trader@gcx.test").await;

    let Json(session) = auth::login(
        State(state.clone()),
        JsonBody(LoginRequest {
            email: "TRADER@gcx.test".to_string(),
            password: PASSWORD.to_string(),
        }),
    )
    .await
    .unwrap();
    assert!(session.user.last_login.is_some());

    for (email, password) in [("trader@gcx.test", "wrong-pass"), ("nobody@gcx.test", PASSWORD)] {
        let err = auth::login(
            State(state.clone()),
            JsonBody(LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "Invalid credentials");
    }
}

#[tokio::test]
async fn test_change_password_requires_current_password() {
    let state = test_state();
    let user = seed_user(&state, Role::User, "member@gcx.test").await;

    let err = users::change_password(
        user.clone(),
        State(state.clone()),
        JsonBody(gcx_cms::models::ChangePasswordRequest {
            current_password: "not-it".to_string(),
            new_password: "brand-new".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(err.to_string(), "Current password is incorrect");

    let Json(changed) = users::change_password(
        user.clone(),
        State(state.clone()),
        JsonBody(gcx_cms::models::ChangePasswordRequest {
            current_password: PASSWORD.to_string(),
            new_password: "brand-new".to_string(),
        }),
    )
    .await
    .unwrap();
    assert!(!changed.message.is_empty());

    let Json(session) = auth::login(
        State(state),
        JsonBody(LoginRequest {
            email: "member@gcx.test".to_string(),
            password: "brand-new".to_string(),
        }),
    )
    .await
    .expect("new password works");
    assert_eq!(session.user.id, user.id);
}

#[tokio::test]
async fn test_admin_cannot_demote_or_disable_self() {
    let state = test_state();
    let admin = seed_user(&state, Role::Admin, "admin@gcx.test").await;
    let blogger = seed_user(&state, Role::Blogger, "blogger@gcx.test").await;

    let err = users::update_user_access(
        admin.clone(),
        State(state.clone()),
        Path(admin.id),
        JsonBody(UpdateUserAccessRequest {
            role: Some(Role::User),
            is_active: None,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

    let Json(disabled) = users::update_user_access(
        admin,
        State(state.clone()),
        Path(blogger.id),
        JsonBody(UpdateUserAccessRequest {
            role: Some(Role::Premium),
            is_active: Some(false),
        }),
    )
    .await
    .unwrap();
    assert_eq!(disabled.role, Role::Premium);
    assert!(!disabled.is_active);

    let err = auth::login(
        State(state),
        JsonBody(LoginRequest {
            email: "blogger@gcx.test".to_string(),
            password: PASSWORD.to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
}

// --- Subscriptions ---

#[tokio::test]
async fn test_subscription_lifecycle() {
    let state = test_state();
    let user = seed_user(&state, Role::User, "buyer@gcx.test").await;
    let stranger = seed_user(&state, Role::Trader, "stranger@gcx.test").await;

    let (_, Json(basic)) = market::create_plan(State(state.clone()), JsonBody(plan("Basic", 50.0)))
        .await
        .unwrap();
    let mut retired_input = plan("Retired", 10.0);
    retired_input.is_active = false;
    let (_, Json(retired)) = market::create_plan(State(state.clone()), JsonBody(retired_input))
        .await
        .unwrap();

    let subscribe = |plan_id| SubscribeRequest {
        plan_id,
        payment_method: Some("momo".to_string()),
        payment_reference: None,
        auto_renew: true,
    };

    let err = market::create_subscription(
        user.clone(),
        State(state.clone()),
        JsonBody(subscribe(retired.id)),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

    let (status, Json(subscription)) = market::create_subscription(
        user.clone(),
        State(state.clone()),
        JsonBody(subscribe(basic.id)),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(subscription.status, subscription_status::ACTIVE);
    assert_eq!(subscription.amount_paid, 50.0);
    assert_eq!(
        (subscription.end_date - subscription.start_date).num_days(),
        30
    );

    let err = market::create_subscription(
        user.clone(),
        State(state.clone()),
        JsonBody(subscribe(basic.id)),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

    let err = market::cancel_subscription(stranger, State(state.clone()), Path(subscription.id))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

    let err = market::delete_plan(State(state.clone()), Path(basic.id))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

    let Json(cancelled) =
        market::cancel_subscription(user.clone(), State(state.clone()), Path(subscription.id))
            .await
            .unwrap();
    assert_eq!(cancelled.status, subscription_status::CANCELLED);
    assert!(!cancelled.auto_renew);

    let err = market::get_subscription(user, State(state)).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(err.to_string(), "No active subscription");
}

// --- Market analytics ---

fn price_at(commodity: &str, timestamp: &str, price: f64, volume: f64) -> PriceInput {
    serde_json::from_value(serde_json::json!({
        "commodity": commodity,
        "price": price,
        "volume": volume,
        "market_date": timestamp,
    }))
    .expect("price input")
}

fn analytics_query(commodity: Option<&str>, start: Option<&str>, end: Option<&str>) -> AnalyticsQuery {
    AnalyticsQuery {
        commodity: commodity.map(str::to_string),
        start_date: start.map(str::to_string),
        end_date: end.map(str::to_string),
    }
}

#[tokio::test]
async fn test_market_analytics_aggregates_each_day_in_window() {
    let state = test_state();
    for input in [
        price_at("Maize", "2026-03-01T09:00:00Z", 100.0, 10.0),
        price_at("Maize", "2026-03-01T15:00:00Z", 104.0, 5.0),
        price_at("Soya", "2026-03-01T12:00:00Z", 300.0, 50.0),
        price_at("Maize", "2026-03-02T16:00:00Z", 103.5, 2.0),
        price_at("Maize", "2026-03-02T09:00:00Z", 104.0, 8.0),
        price_at("Maize", "2026-03-05T09:00:00Z", 90.0, 1.0),
    ] {
        state.repo.create_price(&input).await.unwrap();
    }

    let Json(analytics) = market::get_market_analytics(
        State(state),
        Query(analytics_query(Some("Maize"), Some("2026-03-01"), Some("2026-03-02"))),
    )
    .await
    .unwrap();

    assert_eq!(analytics.commodity, "Maize");
    assert_eq!(analytics.count, 2);
    let days: Vec<String> = analytics.data.iter().map(|d| d.date.to_string()).collect();
    assert_eq!(days, vec!["2026-03-01", "2026-03-02"]);

    let first = &analytics.data[0];
    assert_eq!(first.open_price, 100.0);
    assert_eq!(first.close_price, 104.0);
    assert_eq!(first.high_price, 104.0);
    assert_eq!(first.low_price, 100.0);
    assert_eq!(first.average_price, 102.0);
    assert_eq!(first.total_volume, 15.0);
    assert_eq!(first.transaction_count, 2);
    assert!((first.price_change_percent - 4.0).abs() < 1e-9);
    assert_eq!(first.market_sentiment, "bullish");

    // The later observation of the day is the close, whatever the insert order.
    let second = &analytics.data[1];
    assert_eq!(second.open_price, 104.0);
    assert_eq!(second.close_price, 103.5);
    assert_eq!(second.market_sentiment, "neutral");
}

#[tokio::test]
async fn test_market_analytics_rejects_bad_parameters() {
    let state = test_state();
    let cases = [
        (analytics_query(None, None, None), "Commodity parameter is required"),
        (
            analytics_query(Some("Maize"), Some("03/01/2026"), None),
            "Invalid start_date format. Use YYYY-MM-DD",
        ),
        (
            analytics_query(Some("Maize"), None, Some("2026-02-30")),
            "Invalid end_date format. Use YYYY-MM-DD",
        ),
    ];

    for (query, expected) in cases {
        let err = market::get_market_analytics(State(state.clone()), Query(query))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), expected);
    }
}
