//! Market data: public price feeds, subscriptions, alerts and the admin maintenance
//! endpoints for prices and plans.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{Duration, Utc};

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    extract::JsonBody,
    handlers::MessageResponse,
    models::{
        Validate,
        market::{
            AlertInput, AnalyticsQuery, DEFAULT_WINDOW_DAYS, HistoryQuery, MarketAnalytics,
            MarketPrice, MarketSummary, NewSubscription, PlanInput, PriceAlert, PriceInput,
            RealtimeSnapshot, SubscribeRequest, SubscriptionPlan, UpdateSubscriptionRequest,
            UserSubscription,
        },
    },
    repository::RepositoryState,
};

// --- Public feeds ---

/// get_current_prices
///
/// [Public Route] Latest observation per commodity.
#[utoipa::path(
    get,
    path = "/api/marketdata/prices",
    tag = "marketdata",
    responses((status = 200, description = "Latest prices", body = Vec<MarketPrice>))
)]
pub async fn get_current_prices(
    State(state): State<AppState>,
) -> Result<Json<Vec<MarketPrice>>, ApiError> {
    Ok(Json(state.repo.latest_prices().await?))
}

/// get_commodity_prices
///
/// [Public Route] One commodity over the last 30 days, oldest first.
#[utoipa::path(
    get,
    path = "/api/marketdata/prices/{commodity}",
    tag = "marketdata",
    params(("commodity" = String, Path, description = "Commodity name")),
    responses((status = 200, description = "Price series", body = Vec<MarketPrice>))
)]
pub async fn get_commodity_prices(
    State(state): State<AppState>,
    Path(commodity): Path<String>,
) -> Result<Json<Vec<MarketPrice>>, ApiError> {
    let end = Utc::now();
    let start = end - Duration::days(DEFAULT_WINDOW_DAYS);
    Ok(Json(
        state
            .repo
            .prices_between(Some(&commodity), start, end)
            .await?,
    ))
}

/// get_price_history
///
/// [Public Route] Observations between `start` and `end`, optionally for one
/// commodity. Missing bounds default to the last 30 days.
#[utoipa::path(
    get,
    path = "/api/marketdata/history",
    tag = "marketdata",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Price history", body = Vec<MarketPrice>),
        (status = 400, description = "start is after end")
    )
)]
pub async fn get_price_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<MarketPrice>>, ApiError> {
    let end = query.end.unwrap_or_else(Utc::now);
    let start = query
        .start
        .unwrap_or_else(|| end - Duration::days(DEFAULT_WINDOW_DAYS));
    if start > end {
        return Err(ApiError::Validation(
            "start must not be after end".to_string(),
        ));
    }
    let commodity = query.commodity.as_deref().filter(|c| !c.trim().is_empty());
    Ok(Json(
        state.repo.prices_between(commodity, start, end).await?,
    ))
}

/// get_market_summary
///
/// [Public Route] Latest price plus the 30-day high, low and average.
#[utoipa::path(
    get,
    path = "/api/marketdata/summary/{commodity}",
    tag = "marketdata",
    params(("commodity" = String, Path, description = "Commodity name")),
    responses(
        (status = 200, description = "Summary", body = MarketSummary),
        (status = 404, description = "No recent data for the commodity")
    )
)]
pub async fn get_market_summary(
    State(state): State<AppState>,
    Path(commodity): Path<String>,
) -> Result<Json<MarketSummary>, ApiError> {
    let end = Utc::now();
    let start = end - Duration::days(DEFAULT_WINDOW_DAYS);
    let prices = state
        .repo
        .prices_between(Some(&commodity), start, end)
        .await?;
    let summary = MarketSummary::from_prices(&commodity, &prices)
        .ok_or_else(|| ApiError::not_found("Market data"))?;
    Ok(Json(summary))
}

/// get_plans
///
/// [Public Route] Active plans by sort order, then price.
#[utoipa::path(
    get,
    path = "/api/marketdata/plans",
    tag = "marketdata",
    responses((status = 200, description = "Active plans", body = Vec<SubscriptionPlan>))
)]
pub async fn get_plans(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubscriptionPlan>>, ApiError> {
    Ok(Json(state.repo.list_plans(true).await?))
}

/// get_realtime
///
/// [Realtime Route] Latest prices stamped with the time they were read.
#[utoipa::path(
    get,
    path = "/api/marketdata/realtime",
    tag = "marketdata",
    responses(
        (status = 200, description = "Snapshot", body = RealtimeSnapshot),
        (status = 403, description = "Plan does not include realtime data")
    )
)]
pub async fn get_realtime(
    State(state): State<AppState>,
) -> Result<Json<RealtimeSnapshot>, ApiError> {
    let prices = state.repo.latest_prices().await?;
    Ok(Json(RealtimeSnapshot {
        as_of: Utc::now(),
        prices,
    }))
}

/// get_market_analytics
///
/// [Historical Route] Day-by-day aggregates for one commodity, oldest first.
/// Dates are `YYYY-MM-DD`; the window defaults to the last 30 days.
#[utoipa::path(
    get,
    path = "/api/marketdata/analytics",
    tag = "marketdata",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Daily analytics", body = MarketAnalytics),
        (status = 400, description = "Missing commodity or malformed date"),
        (status = 403, description = "Plan does not include historical data")
    )
)]
pub async fn get_market_analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<MarketAnalytics>, ApiError> {
    let window = query.window(Utc::now())?;
    let data = state
        .repo
        .daily_analytics(&window.commodity, window.start, window.end)
        .await?;
    Ok(Json(MarketAnalytics::new(window, data)))
}

// --- Subscriptions ---

/// Someone else's subscription is reported as missing rather than forbidden.
async fn owned_subscription(
    repo: &RepositoryState,
    user: &AuthUser,
    id: i64,
) -> Result<UserSubscription, ApiError> {
    repo.get_subscription(id)
        .await?
        .filter(|subscription| subscription.user_id == user.id)
        .ok_or_else(|| ApiError::not_found("Subscription"))
}

/// get_subscription
///
/// [Market Route] The caller's active subscription with its plan.
#[utoipa::path(
    get,
    path = "/api/marketdata/subscription",
    tag = "marketdata",
    responses(
        (status = 200, description = "Active subscription", body = UserSubscription),
        (status = 404, description = "No active subscription")
    )
)]
pub async fn get_subscription(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserSubscription>, ApiError> {
    let subscription = state
        .repo
        .active_subscription(user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No active subscription".to_string()))?;
    Ok(Json(subscription))
}

/// create_subscription
///
/// [Market Route] Subscribes the caller to an active plan. The subscription runs for
/// the plan's duration from now and is charged at the plan's price.
#[utoipa::path(
    post,
    path = "/api/marketdata/subscription",
    tag = "marketdata",
    request_body = SubscribeRequest,
    responses(
        (status = 201, description = "Subscribed", body = UserSubscription),
        (status = 400, description = "Plan inactive or subscription already active")
    )
)]
pub async fn create_subscription(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SubscribeRequest>,
) -> Result<(StatusCode, Json<UserSubscription>), ApiError> {
    let plan = state
        .repo
        .get_plan(payload.plan_id)
        .await?
        .filter(|plan| plan.is_active)
        .ok_or_else(|| ApiError::Validation("Invalid or inactive plan".to_string()))?;

    if state.repo.active_subscription(user.id).await?.is_some() {
        return Err(ApiError::Validation(
            "User already has an active subscription".to_string(),
        ));
    }

    let start_date = Utc::now();
    let new = NewSubscription {
        user_id: user.id,
        plan_id: plan.id,
        start_date,
        end_date: start_date + Duration::days(i64::from(plan.duration_days)),
        auto_renew: payload.auto_renew,
        payment_method: payload.payment_method,
        payment_reference: payload.payment_reference,
        amount_paid: plan.price,
        currency: plan.currency.clone(),
    };
    let mut subscription = state.repo.create_subscription(&new).await?;
    subscription.plan.get_or_insert(plan);
    tracing::info!(
        user_id = user.id,
        subscription_id = subscription.id,
        plan_id = subscription.plan_id,
        "subscription created"
    );
    Ok((StatusCode::CREATED, Json(subscription)))
}

#[utoipa::path(
    put,
    path = "/api/marketdata/subscription/{id}",
    tag = "marketdata",
    params(("id" = i64, Path, description = "Subscription id")),
    request_body = UpdateSubscriptionRequest,
    responses(
        (status = 200, description = "Subscription updated", body = UserSubscription),
        (status = 404, description = "Subscription not found")
    )
)]
pub async fn update_subscription(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<UpdateSubscriptionRequest>,
) -> Result<Json<UserSubscription>, ApiError> {
    owned_subscription(&state.repo, &user, id).await?;
    let subscription = state
        .repo
        .update_subscription(id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Subscription"))?;
    Ok(Json(subscription))
}

/// cancel_subscription
///
/// [Market Route] Cancels rather than deletes: the record stays, marked cancelled
/// with auto-renew off.
#[utoipa::path(
    delete,
    path = "/api/marketdata/subscription/{id}",
    tag = "marketdata",
    params(("id" = i64, Path, description = "Subscription id")),
    responses(
        (status = 200, description = "Subscription cancelled", body = UserSubscription),
        (status = 404, description = "Subscription not found")
    )
)]
pub async fn cancel_subscription(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserSubscription>, ApiError> {
    owned_subscription(&state.repo, &user, id).await?;
    let subscription = state
        .repo
        .cancel_subscription(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Subscription"))?;
    tracing::info!(user_id = user.id, subscription_id = id, "subscription cancelled");
    Ok(Json(subscription))
}

// --- Alerts ---

async fn owned_alert(
    repo: &RepositoryState,
    user: &AuthUser,
    id: i64,
) -> Result<PriceAlert, ApiError> {
    repo.get_alert(id)
        .await?
        .filter(|alert| alert.user_id == user.id)
        .ok_or_else(|| ApiError::not_found("Alert"))
}

#[utoipa::path(
    get,
    path = "/api/marketdata/alerts",
    tag = "marketdata",
    responses((status = 200, description = "The caller's alerts", body = Vec<PriceAlert>))
)]
pub async fn list_alerts(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<PriceAlert>>, ApiError> {
    Ok(Json(state.repo.list_alerts(user.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/marketdata/alerts/{id}",
    tag = "marketdata",
    params(("id" = i64, Path, description = "Alert id")),
    responses(
        (status = 200, description = "Alert", body = PriceAlert),
        (status = 404, description = "Alert not found")
    )
)]
pub async fn get_alert(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PriceAlert>, ApiError> {
    Ok(Json(owned_alert(&state.repo, &user, id).await?))
}

/// create_alert
///
/// [Market Route] `condition` is `above` or `below`.
#[utoipa::path(
    post,
    path = "/api/marketdata/alerts",
    tag = "marketdata",
    request_body = AlertInput,
    responses(
        (status = 201, description = "Alert created", body = PriceAlert),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_alert(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<AlertInput>,
) -> Result<(StatusCode, Json<PriceAlert>), ApiError> {
    payload.validate()?;
    let alert = state.repo.create_alert(user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(alert)))
}

#[utoipa::path(
    put,
    path = "/api/marketdata/alerts/{id}",
    tag = "marketdata",
    params(("id" = i64, Path, description = "Alert id")),
    request_body = AlertInput,
    responses(
        (status = 200, description = "Alert updated", body = PriceAlert),
        (status = 404, description = "Alert not found")
    )
)]
pub async fn update_alert(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<AlertInput>,
) -> Result<Json<PriceAlert>, ApiError> {
    payload.validate()?;
    owned_alert(&state.repo, &user, id).await?;
    let alert = state
        .repo
        .update_alert(id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Alert"))?;
    Ok(Json(alert))
}

#[utoipa::path(
    delete,
    path = "/api/marketdata/alerts/{id}",
    tag = "marketdata",
    params(("id" = i64, Path, description = "Alert id")),
    responses(
        (status = 200, description = "Alert deleted", body = MessageResponse),
        (status = 404, description = "Alert not found")
    )
)]
pub async fn delete_alert(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    owned_alert(&state.repo, &user, id).await?;
    if !state.repo.delete_alert(id).await? {
        return Err(ApiError::not_found("Alert"));
    }
    Ok(Json(MessageResponse::new("Alert deleted successfully")))
}

// --- Admin maintenance ---

/// create_price
///
/// [Admin Route] Records an observation; `market_date` defaults to now.
#[utoipa::path(
    post,
    path = "/api/admin/marketdata/prices",
    tag = "marketdata",
    request_body = PriceInput,
    responses(
        (status = 201, description = "Price recorded", body = MarketPrice),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_price(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<PriceInput>,
) -> Result<(StatusCode, Json<MarketPrice>), ApiError> {
    payload.validate()?;
    let price = state.repo.create_price(&payload).await?;
    tracing::info!(price_id = price.id, commodity = %price.commodity, "price recorded");
    Ok((StatusCode::CREATED, Json(price)))
}

#[utoipa::path(
    put,
    path = "/api/admin/marketdata/prices/{id}",
    tag = "marketdata",
    params(("id" = i64, Path, description = "Price id")),
    request_body = PriceInput,
    responses(
        (status = 200, description = "Price updated", body = MarketPrice),
        (status = 404, description = "Price not found")
    )
)]
pub async fn update_price(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<PriceInput>,
) -> Result<Json<MarketPrice>, ApiError> {
    payload.validate()?;
    let price = state
        .repo
        .update_price(id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Price"))?;
    Ok(Json(price))
}

#[utoipa::path(
    delete,
    path = "/api/admin/marketdata/prices/{id}",
    tag = "marketdata",
    params(("id" = i64, Path, description = "Price id")),
    responses(
        (status = 200, description = "Price deleted", body = MessageResponse),
        (status = 404, description = "Price not found")
    )
)]
pub async fn delete_price(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.repo.delete_price(id).await? {
        return Err(ApiError::not_found("Price"));
    }
    Ok(Json(MessageResponse::new("Price deleted successfully")))
}

/// list_all_plans
///
/// [Admin Route] Includes inactive plans.
#[utoipa::path(
    get,
    path = "/api/admin/marketdata/plans",
    tag = "marketdata",
    responses((status = 200, description = "All plans", body = Vec<SubscriptionPlan>))
)]
pub async fn list_all_plans(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubscriptionPlan>>, ApiError> {
    Ok(Json(state.repo.list_plans(false).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/marketdata/plans",
    tag = "marketdata",
    request_body = PlanInput,
    responses(
        (status = 201, description = "Plan created", body = SubscriptionPlan),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_plan(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<PlanInput>,
) -> Result<(StatusCode, Json<SubscriptionPlan>), ApiError> {
    payload.validate()?;
    let plan = state.repo.create_plan(&payload).await?;
    tracing::info!(plan_id = plan.id, name = %plan.name, "plan created");
    Ok((StatusCode::CREATED, Json(plan)))
}

#[utoipa::path(
    put,
    path = "/api/admin/marketdata/plans/{id}",
    tag = "marketdata",
    params(("id" = i64, Path, description = "Plan id")),
    request_body = PlanInput,
    responses(
        (status = 200, description = "Plan updated", body = SubscriptionPlan),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn update_plan(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<PlanInput>,
) -> Result<Json<SubscriptionPlan>, ApiError> {
    payload.validate()?;
    let plan = state
        .repo
        .update_plan(id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Plan"))?;
    Ok(Json(plan))
}

/// delete_plan
///
/// [Admin Route] A plan that still has subscriptions cannot be deleted (400);
/// deactivate it instead.
#[utoipa::path(
    delete,
    path = "/api/admin/marketdata/plans/{id}",
    tag = "marketdata",
    params(("id" = i64, Path, description = "Plan id")),
    responses(
        (status = 200, description = "Plan deleted", body = MessageResponse),
        (status = 400, description = "Plan is referenced by subscriptions"),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn delete_plan(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.repo.delete_plan(id).await? {
        return Err(ApiError::not_found("Plan"));
    }
    Ok(Json(MessageResponse::new("Plan deleted successfully")))
}
