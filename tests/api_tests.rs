mod common;

use common::{PASSWORD, spawn_app, token_for};
use gcx_cms::models::{ContentFilter, ContentKind, CreateSettingRequest, Role};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let response = Client::new()
        .get(app.url("/health"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "GCX Market Data Platform API");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(app.url("/api/pages"))
        .json(&json!({ "title": "Sneaky" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Authorization header required");

    let response = client
        .get(app.url("/api/user/profile"))
        .bearer_auth("garbage")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The rejected create left no page behind.
    let pages = app
        .state
        .repo
        .list_pages(&ContentFilter::default())
        .await
        .unwrap();
    assert_eq!(pages.pagination.total, 0);
    assert!(
        !app.state
            .repo
            .slug_exists(ContentKind::Page, "sneaky", None)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_register_login_and_profile() {
    let app = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(app.url("/api/auth/register"))
        .json(&json!({ "name": "Kofi", "email": "kofi@gcx.test", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let registered: Value = response.json().await.unwrap();
    assert_eq!(registered["user"]["role"], "user");
    assert!(registered["user"].get("password_hash").is_none());

    let response = client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": "kofi@gcx.test", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let session: Value = response.json().await.unwrap();
    let token = session["token"].as_str().expect("token").to_string();

    let profile: Value = client
        .get(app.url("/api/user/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["email"], "kofi@gcx.test");

    let updated: Value = client
        .put(app.url("/api/user/profile"))
        .bearer_auth(&token)
        .json(&json!({ "company": "GCX" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["company"], "GCX");
    assert_eq!(updated["name"], "Kofi");
}

#[tokio::test]
async fn test_malformed_body_is_a_400() {
    let app = spawn_app().await;
    let response = Client::new()
        .post(app.url("/api/auth/login"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid request body");
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn test_roles_are_gated_per_route_group() {
    let app = spawn_app().await;
    let client = Client::new();
    let user = token_for(&app.state, Role::User, "user@gcx.test").await;
    let blogger = token_for(&app.state, Role::Blogger, "blogger@gcx.test").await;
    let trader = token_for(&app.state, Role::Trader, "trader@gcx.test").await;

    let status = |token: String, method: reqwest::Method, path: &str| {
        let request = client.request(method, app.url(path)).bearer_auth(token);
        async move { request.send().await.unwrap().status() }
    };

    // Content management: admin and blogger only.
    assert_eq!(
        status(user.clone(), reqwest::Method::GET, "/api/pages").await,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        status(blogger.clone(), reqwest::Method::GET, "/api/pages").await,
        StatusCode::OK
    );

    // User administration: admin only.
    assert_eq!(
        status(blogger.clone(), reqwest::Method::GET, "/api/admin/users").await,
        StatusCode::FORBIDDEN
    );

    // Realtime data: trader, premium and admin.
    assert_eq!(
        status(user.clone(), reqwest::Method::GET, "/api/marketdata/realtime").await,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        status(trader.clone(), reqwest::Method::GET, "/api/marketdata/realtime").await,
        StatusCode::OK
    );

    // Historical analytics: trader, premium and admin.
    assert_eq!(
        status(
            user.clone(),
            reqwest::Method::GET,
            "/api/marketdata/analytics?commodity=Maize"
        )
        .await,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        status(
            trader.clone(),
            reqwest::Method::GET,
            "/api/marketdata/analytics?commodity=Maize"
        )
        .await,
        StatusCode::OK
    );
    assert_eq!(
        status(trader.clone(), reqwest::Method::GET, "/api/marketdata/analytics").await,
        StatusCode::BAD_REQUEST
    );

    // Market features: every role except blogger.
    assert_eq!(
        status(blogger, reqwest::Method::GET, "/api/marketdata/alerts").await,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        status(user, reqwest::Method::GET, "/api/marketdata/alerts").await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_only_published_content_is_public() {
    let app = spawn_app().await;
    let client = Client::new();
    let blogger = token_for(&app.state, Role::Blogger, "blogger@gcx.test").await;

    for (title, status) in [("Hidden Draft", "draft"), ("Grain Report", "published")] {
        let response = client
            .post(app.url("/api/cms/posts"))
            .bearer_auth(&blogger)
            .json(&json!({
                "title": title,
                "content": "Body",
                "excerpt": "Summary",
                "status": status,
                "tags": ["grain"],
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let listing: Value = client
        .get(app.url("/api/posts"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing["pagination"]["total"], 1);
    assert_eq!(listing["data"][0]["slug"], "grain-report");
    assert_eq!(listing["data"][0]["author_name"], "blogger account");

    let draft = client
        .get(app.url("/api/posts/hidden-draft"))
        .send()
        .await
        .unwrap();
    assert_eq!(draft.status(), StatusCode::NOT_FOUND);

    let published = client
        .get(app.url("/api/posts/grain-report"))
        .send()
        .await
        .unwrap();
    assert_eq!(published.status(), StatusCode::OK);

    let response = client
        .post(app.url("/api/pages"))
        .bearer_auth(&blogger)
        .json(&json!({ "title": "About GCX", "status": "published" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let page: Value = client
        .get(app.url("/api/pages/about-gcx"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["title"], "About GCX");
    assert!(page.get("deleted_at").is_none());
}

#[tokio::test]
async fn test_pagination_envelope() {
    let app = spawn_app().await;
    let client = Client::new();
    let blogger = token_for(&app.state, Role::Blogger, "blogger@gcx.test").await;

    for n in 0..5 {
        client
            .post(app.url("/api/pages"))
            .bearer_auth(&blogger)
            .json(&json!({ "title": format!("Page {n}") }))
            .send()
            .await
            .unwrap();
    }

    let body: Value = client
        .get(app.url("/api/pages?page=2&limit=2"))
        .bearer_auth(&blogger)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(
        body["pagination"],
        json!({ "page": 2, "limit": 2, "total": 5, "totalPages": 3 })
    );

    let clamped: Value = client
        .get(app.url("/api/pages?page=0&limit=1000"))
        .bearer_auth(&blogger)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(clamped["pagination"]["page"], 1);
    assert_eq!(clamped["pagination"]["limit"], 100);
}

#[tokio::test]
async fn test_public_settings_routes() {
    let app = spawn_app().await;
    let client = Client::new();

    for (key, group, is_public) in [
        ("hero_title", "hero", true),
        ("site_name", "general", true),
        ("api_secret", "general", false),
    ] {
        app.state
            .repo
            .create_setting(&CreateSettingRequest {
                key: key.to_string(),
                value: format!("{key}-value"),
                setting_type: "string".to_string(),
                group: group.to_string(),
                label: String::new(),
                description: String::new(),
                is_public,
                sort_order: 0,
            })
            .await
            .unwrap();
    }

    let all: Value = client
        .get(app.url("/api/settings/public"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        all,
        json!({ "settings": { "hero_title": "hero_title-value", "site_name": "site_name-value" } })
    );

    let hero: Value = client
        .get(app.url("/api/settings/hero"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(hero, json!({ "settings": { "hero_title": "hero_title-value" } }));

    // Any other key still needs a session.
    let response = client
        .get(app.url("/api/settings/site_name"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_settings_writes_are_admin_only() {
    let app = spawn_app().await;
    let client = Client::new();
    let blogger = token_for(&app.state, Role::Blogger, "blogger@gcx.test").await;
    let admin = token_for(&app.state, Role::Admin, "admin@gcx.test").await;
    let setting = json!({ "key": "footer_text", "value": "(c) GCX", "type": "text" });

    let response = client
        .post(app.url("/api/settings"))
        .bearer_auth(&blogger)
        .json(&setting)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .post(app.url("/api/settings"))
        .bearer_auth(&admin)
        .json(&setting)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .put(app.url("/api/settings/batch"))
        .bearer_auth(&admin)
        .json(&json!([{ "key": "footer_text", "value": "GCX 2026" }]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["updated"], 1);

    let stored: Value = client
        .get(app.url("/api/settings/footer_text"))
        .bearer_auth(&blogger)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stored["value"], "GCX 2026");
    assert_eq!(stored["type"], "text");
}

#[tokio::test]
async fn test_batch_array_moves_setting_into_public_group() {
    let app = spawn_app().await;
    let client = Client::new();
    let admin = token_for(&app.state, Role::Admin, "admin@gcx.test").await;

    let response = client
        .post(app.url("/api/settings"))
        .bearer_auth(&admin)
        .json(&json!({ "key": "hero_title", "value": "Old", "type": "text" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .put(app.url("/api/settings/batch"))
        .bearer_auth(&admin)
        .json(&json!([{
            "key": "hero_title",
            "value": "Trade with confidence",
            "type": "text",
            "group": "hero",
            "label": "Hero",
            "description": "Home page headline",
            "is_public": true,
            "sort_order": 3
        }]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["updated"], 1);

    for path in ["/api/settings/public/hero", "/api/settings/hero"] {
        let group: Value = client
            .get(app.url(path))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(group["settings"]["hero_title"], "Trade with confidence", "{path}");
    }

    let stored: Value = client
        .get(app.url("/api/settings/hero_title"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stored["group"], "hero");
    assert_eq!(stored["label"], "Hero");
    assert_eq!(stored["is_public"], true);
    assert_eq!(stored["sort_order"], 3);
}

#[tokio::test]
async fn test_team_member_reorder_route() {
    let app = spawn_app().await;
    let client = Client::new();
    let admin = token_for(&app.state, Role::Admin, "admin@gcx.test").await;

    let mut ids = Vec::new();
    for name in ["Ama", "Kwame"] {
        let member: Value = client
            .post(app.url("/api/team-members"))
            .bearer_auth(&admin)
            .json(&json!({ "name": name, "title": "Director", "type": "executive" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        ids.push(member["id"].as_i64().expect("id"));
    }

    let response = client
        .put(app.url("/api/team-members/reorder"))
        .bearer_auth(&admin)
        .json(&json!({ "members": [
            { "id": ids[0], "order_index": 2 },
            { "id": ids[1], "order_index": 1 },
        ] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listing: Value = client
        .get(app.url("/api/team-members?type=executive"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing["data"][0]["name"], "Kwame");
    assert_eq!(listing["data"][1]["name"], "Ama");
}

#[tokio::test]
async fn test_disabled_account_is_locked_out_immediately() {
    let app = spawn_app().await;
    let client = Client::new();
    let token = token_for(&app.state, Role::Trader, "trader@gcx.test").await;

    let user = app
        .state
        .repo
        .find_user_by_email("trader@gcx.test")
        .await
        .unwrap()
        .expect("seeded");
    app.state
        .repo
        .update_user_access(
            user.id,
            &gcx_cms::models::UpdateUserAccessRequest {
                role: None,
                is_active: Some(false),
            },
        )
        .await
        .unwrap();

    let response = client
        .get(app.url("/api/user/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "User account is disabled");
}
