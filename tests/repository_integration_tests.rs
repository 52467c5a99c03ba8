use chrono::{Duration, Utc};
use gcx_cms::{
    MemoryRepository,
    models::{
        MenuInput, MenuItemInput, NewUser, Role, UpdateUserAccessRequest, UserQuery,
        directory::{CommodityInput, DirectoryFilter, ReorderEntry, TeamMemberInput},
        market::{NewSubscription, PlanInput, PriceInput},
    },
    repository::{
        DirectoryRepository, MarketRepository, MenuRepository, RepoError, UserRepository,
    },
};

fn new_user(email: &str, role: Role) -> NewUser {
    NewUser {
        name: email.split('@').next().unwrap_or_default().to_string(),
        email: email.to_string(),
        password_hash: "not-a-real-hash".to_string(),
        role,
        is_active: true,
    }
}

fn team_member(name: &str, member_type: &str) -> TeamMemberInput {
    serde_json::from_value(serde_json::json!({ "name": name, "type": member_type }))
        .expect("team member input")
}

fn commodity(code: &str) -> CommodityInput {
    serde_json::from_value(serde_json::json!({
        "name": format!("Commodity {code}"),
        "code": code,
        "current_price": 110.0,
        "previous_price": 100.0,
    }))
    .expect("commodity input")
}

fn price(commodity: &str, value: f64, days_ago: i64) -> PriceInput {
    serde_json::from_value(serde_json::json!({
        "commodity": commodity,
        "price": value,
        "market_date": Utc::now() - Duration::days(days_ago),
    }))
    .expect("price input")
}

// --- Users ---

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let repo = MemoryRepository::new();
    repo.create_user(new_user("ama@gcx.test", Role::User)).await.unwrap();

    let err = repo
        .create_user(new_user("ama@gcx.test", Role::Admin))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(ref message) if message == "Email already registered"));
}

#[tokio::test]
async fn test_user_listing_filters() {
    let repo = MemoryRepository::new();
    repo.create_user(new_user("ama@gcx.test", Role::Admin)).await.unwrap();
    repo.create_user(new_user("kofi@gcx.test", Role::Trader)).await.unwrap();
    let yaw = repo.create_user(new_user("yaw@gcx.test", Role::Trader)).await.unwrap();
    repo.update_user_access(
        yaw.id,
        &UpdateUserAccessRequest {
            role: None,
            is_active: Some(false),
        },
    )
    .await
    .unwrap();

    let traders = repo
        .list_users(&UserQuery {
            role: Some(Role::Trader),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(traders.pagination.total, 2);

    let active_traders = repo
        .list_users(&UserQuery {
            role: Some(Role::Trader),
            is_active: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(active_traders.data.len(), 1);
    assert_eq!(active_traders.data[0].email, "kofi@gcx.test");

    let search = repo
        .list_users(&UserQuery {
            search: Some("AMA".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(search.pagination.total, 1);
    assert_eq!(repo.count_admins().await.unwrap(), 1);
}

// --- Directories ---

#[tokio::test]
async fn test_team_members_append_within_their_type() {
    let repo = MemoryRepository::new();
    let first = repo.create_team_member(&team_member("Ama", "executive")).await.unwrap();
    let second = repo.create_team_member(&team_member("Kofi", "executive")).await.unwrap();
    let board = repo.create_team_member(&team_member("Yaw", "board")).await.unwrap();

    assert_eq!(first.order_index, 1);
    assert_eq!(second.order_index, 2);
    assert_eq!(board.order_index, 1);
}

#[tokio::test]
async fn test_reorder_is_all_or_nothing() {
    let repo = MemoryRepository::new();
    let ama = repo.create_team_member(&team_member("Ama", "executive")).await.unwrap();
    let kofi = repo.create_team_member(&team_member("Kofi", "executive")).await.unwrap();

    let err = repo
        .reorder_team_members(&[
            ReorderEntry {
                id: ama.id,
                order_index: 9,
            },
            ReorderEntry {
                id: 404,
                order_index: 1,
            },
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound));
    let unchanged = repo.get_team_member(ama.id).await.unwrap().unwrap();
    assert_eq!(unchanged.order_index, 1);

    repo.reorder_team_members(&[
        ReorderEntry {
            id: ama.id,
            order_index: 2,
        },
        ReorderEntry {
            id: kofi.id,
            order_index: 1,
        },
    ])
    .await
    .unwrap();
    let listing = repo
        .list_team_members(&DirectoryFilter::default())
        .await
        .unwrap();
    let names: Vec<&str> = listing.data.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Kofi", "Ama"]);
}

#[tokio::test]
async fn test_commodity_code_is_unique_and_change_is_derived() {
    let repo = MemoryRepository::new();
    let maize = repo.create_commodity(&commodity("GMAZ")).await.unwrap();
    assert!((maize.price_change - 10.0).abs() < 1e-9);
    assert!((maize.change_percent - 10.0).abs() < 1e-9);

    let err = repo.create_commodity(&commodity("GMAZ")).await.unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));

    let soya = repo.create_commodity(&commodity("GSBN")).await.unwrap();
    let err = repo
        .update_commodity(soya.id, &commodity("GMAZ"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));
    // Keeping its own code is fine.
    assert!(repo.update_commodity(soya.id, &commodity("GSBN")).await.unwrap().is_some());
}

// --- Menus ---

#[tokio::test]
async fn test_menu_deletes_cascade() {
    let repo = MemoryRepository::new();
    let menu = repo
        .create_menu(&MenuInput {
            name: "Main".to_string(),
            location: "header".to_string(),
            is_active: true,
        })
        .await
        .unwrap();
    let item = |label: &str, parent_id: Option<i64>| MenuItemInput {
        label: label.to_string(),
        url: "/".to_string(),
        target: "_self".to_string(),
        icon_class: None,
        parent_id,
        sort_order: 0,
        is_active: true,
    };

    let about = repo.create_menu_item(menu.id, &item("About", None)).await.unwrap();
    let team = repo
        .create_menu_item(menu.id, &item("Team", Some(about.id)))
        .await
        .unwrap();
    repo.create_menu_item(menu.id, &item("Board", Some(team.id)))
        .await
        .unwrap();
    repo.create_menu_item(menu.id, &item("Contact", None)).await.unwrap();

    assert!(repo.delete_menu_item(about.id).await.unwrap());
    let remaining = repo.list_menu_items(menu.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].label, "Contact");

    assert!(repo.delete_menu(menu.id).await.unwrap());
    assert!(repo.list_menu_items(menu.id).await.unwrap().is_empty());
    assert!(!repo.delete_menu(menu.id).await.unwrap());
}

#[tokio::test]
async fn test_inactive_menu_is_not_served_by_location() {
    let repo = MemoryRepository::new();
    repo.create_menu(&MenuInput {
        name: "Old footer".to_string(),
        location: "footer".to_string(),
        is_active: false,
    })
    .await
    .unwrap();

    assert!(repo.find_active_menu("footer").await.unwrap().is_none());
}

// --- Market ---

#[tokio::test]
async fn test_latest_prices_and_window() {
    let repo = MemoryRepository::new();
    repo.create_price(&price("Maize", 100.0, 5)).await.unwrap();
    repo.create_price(&price("Maize", 120.0, 1)).await.unwrap();
    repo.create_price(&price("Soya", 300.0, 2)).await.unwrap();
    repo.create_price(&price("Maize", 90.0, 40)).await.unwrap();

    let latest = repo.latest_prices().await.unwrap();
    let summary: Vec<(&str, f64)> = latest
        .iter()
        .map(|p| (p.commodity.as_str(), p.price))
        .collect();
    assert_eq!(summary, vec![("Maize", 120.0), ("Soya", 300.0)]);

    let end = Utc::now();
    let window = repo
        .prices_between(Some("Maize"), end - Duration::days(30), end)
        .await
        .unwrap();
    let values: Vec<f64> = window.iter().map(|p| p.price).collect();
    assert_eq!(values, vec![100.0, 120.0]);
}

#[tokio::test]
async fn test_one_active_subscription_and_plan_in_use() {
    let repo = MemoryRepository::new();
    let user = repo.create_user(new_user("buyer@gcx.test", Role::User)).await.unwrap();
    let plan = repo
        .create_plan(&PlanInput {
            name: "Pro".to_string(),
            description: String::new(),
            price: 200.0,
            currency: "GHS".to_string(),
            duration_days: 90,
            features: Vec::new(),
            max_users: 1,
            is_active: true,
            sort_order: 0,
        })
        .await
        .unwrap();
    let now = Utc::now();
    let subscription = NewSubscription {
        user_id: user.id,
        plan_id: plan.id,
        start_date: now,
        end_date: now + Duration::days(90),
        auto_renew: false,
        payment_method: None,
        payment_reference: None,
        amount_paid: plan.price,
        currency: plan.currency.clone(),
    };

    let created = repo.create_subscription(&subscription).await.unwrap();
    assert_eq!(created.plan.as_ref().map(|p| p.id), Some(plan.id));

    let err = repo.create_subscription(&subscription).await.unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));

    let err = repo.delete_plan(plan.id).await.unwrap_err();
    assert!(matches!(err, RepoError::Constraint(_)));

    repo.cancel_subscription(created.id).await.unwrap();
    assert!(repo.active_subscription(user.id).await.unwrap().is_none());
    // A cancelled subscription frees the slot.
    repo.create_subscription(&subscription).await.unwrap();
}
