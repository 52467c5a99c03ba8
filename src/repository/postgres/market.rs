use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::PostgresRepository;
use crate::{
    models::market::{
        AlertInput, DailyAnalytics, MarketPrice, NewSubscription, PlanInput, PriceAlert,
        PriceInput, SubscriptionPlan, UpdateSubscriptionRequest, UserSubscription,
        subscription_status,
    },
    repository::{MarketRepository, RepoError, RepoResult, constraints},
};

impl PostgresRepository {
    async fn with_plan(&self, mut subscription: UserSubscription) -> RepoResult<UserSubscription> {
        subscription.plan = self
            .fetch_row::<SubscriptionPlan>("subscription_plans", subscription.plan_id)
            .await?;
        Ok(subscription)
    }

    async fn with_plan_opt(
        &self,
        subscription: Option<UserSubscription>,
    ) -> RepoResult<Option<UserSubscription>> {
        match subscription {
            Some(subscription) => Ok(Some(self.with_plan(subscription).await?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl MarketRepository for PostgresRepository {
    async fn list_plans(&self, active_only: bool) -> RepoResult<Vec<SubscriptionPlan>> {
        let plans = sqlx::query_as::<_, SubscriptionPlan>(
            "SELECT * FROM subscription_plans WHERE (NOT $1 OR is_active) ORDER BY sort_order, price, id",
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(plans)
    }

    async fn get_plan(&self, id: i64) -> RepoResult<Option<SubscriptionPlan>> {
        self.fetch_row("subscription_plans", id).await
    }

    async fn create_plan(&self, input: &PlanInput) -> RepoResult<SubscriptionPlan> {
        let plan = sqlx::query_as::<_, SubscriptionPlan>(
            r#"
            INSERT INTO subscription_plans (
                name, description, price, currency, duration_days, features, max_users,
                is_active, sort_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.price)
        .bind(&input.currency)
        .bind(input.duration_days)
        .bind(&input.features)
        .bind(input.max_users)
        .bind(input.is_active)
        .bind(input.sort_order)
        .fetch_one(&self.pool)
        .await?;
        Ok(plan)
    }

    async fn update_plan(
        &self,
        id: i64,
        input: &PlanInput,
    ) -> RepoResult<Option<SubscriptionPlan>> {
        let plan = sqlx::query_as::<_, SubscriptionPlan>(
            r#"
            UPDATE subscription_plans SET
                name = $2, description = $3, price = $4, currency = $5, duration_days = $6,
                features = $7, max_users = $8, is_active = $9, sort_order = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.price)
        .bind(&input.currency)
        .bind(input.duration_days)
        .bind(&input.features)
        .bind(input.max_users)
        .bind(input.is_active)
        .bind(input.sort_order)
        .fetch_optional(&self.pool)
        .await?;
        Ok(plan)
    }

    async fn delete_plan(&self, id: i64) -> RepoResult<bool> {
        match self.delete_row("subscription_plans", id).await {
            // The generic mapping reads this violation as a missing reference.
            Err(RepoError::Constraint(_)) => {
                Err(RepoError::check_failed(constraints::SUBSCRIPTION_PLAN))
            }
            other => other,
        }
    }

    async fn active_subscription(&self, user_id: i64) -> RepoResult<Option<UserSubscription>> {
        let subscription = sqlx::query_as::<_, UserSubscription>(
            "SELECT * FROM user_subscriptions WHERE user_id = $1 AND status = $2",
        )
        .bind(user_id)
        .bind(subscription_status::ACTIVE)
        .fetch_optional(&self.pool)
        .await?;
        self.with_plan_opt(subscription).await
    }

    async fn create_subscription(&self, new: &NewSubscription) -> RepoResult<UserSubscription> {
        let subscription = sqlx::query_as::<_, UserSubscription>(
            r#"
            INSERT INTO user_subscriptions (
                user_id, plan_id, status, start_date, end_date, auto_renew, payment_method,
                payment_reference, amount_paid, currency
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(new.user_id)
        .bind(new.plan_id)
        .bind(subscription_status::ACTIVE)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.auto_renew)
        .bind(&new.payment_method)
        .bind(&new.payment_reference)
        .bind(new.amount_paid)
        .bind(&new.currency)
        .fetch_one(&self.pool)
        .await?;
        self.with_plan(subscription).await
    }

    async fn get_subscription(&self, id: i64) -> RepoResult<Option<UserSubscription>> {
        let subscription = self
            .fetch_row::<UserSubscription>("user_subscriptions", id)
            .await?;
        self.with_plan_opt(subscription).await
    }

    async fn update_subscription(
        &self,
        id: i64,
        changes: &UpdateSubscriptionRequest,
    ) -> RepoResult<Option<UserSubscription>> {
        let subscription = sqlx::query_as::<_, UserSubscription>(
            r#"
            UPDATE user_subscriptions SET
                auto_renew        = COALESCE($2, auto_renew),
                payment_method    = COALESCE($3, payment_method),
                payment_reference = COALESCE($4, payment_reference),
                updated_at        = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.auto_renew)
        .bind(&changes.payment_method)
        .bind(&changes.payment_reference)
        .fetch_optional(&self.pool)
        .await?;
        self.with_plan_opt(subscription).await
    }

    async fn cancel_subscription(&self, id: i64) -> RepoResult<Option<UserSubscription>> {
        let subscription = sqlx::query_as::<_, UserSubscription>(
            r#"
            UPDATE user_subscriptions SET status = $2, auto_renew = FALSE, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(subscription_status::CANCELLED)
        .fetch_optional(&self.pool)
        .await?;
        self.with_plan_opt(subscription).await
    }

    async fn latest_prices(&self) -> RepoResult<Vec<MarketPrice>> {
        let prices = sqlx::query_as::<_, MarketPrice>(
            r#"
            SELECT DISTINCT ON (commodity) *
            FROM market_prices
            ORDER BY commodity, market_date DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(prices)
    }

    async fn prices_between(
        &self,
        commodity: Option<&str>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Vec<MarketPrice>> {
        let prices = sqlx::query_as::<_, MarketPrice>(
            r#"
            SELECT * FROM market_prices
            WHERE ($1::TEXT IS NULL OR commodity = $1)
              AND market_date BETWEEN $2 AND $3
            ORDER BY market_date ASC, id ASC
            "#,
        )
        .bind(commodity)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(prices)
    }

    async fn daily_analytics(
        &self,
        commodity: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Vec<DailyAnalytics>> {
        let days = sqlx::query_as::<_, DailyAnalytics>(
            r#"
            SELECT
                commodity,
                (market_date AT TIME ZONE 'UTC')::DATE                   AS date,
                SUM(volume)                                              AS total_volume,
                AVG(price)                                               AS average_price,
                MAX(price)                                               AS high_price,
                MIN(price)                                               AS low_price,
                (ARRAY_AGG(price ORDER BY market_date ASC, id ASC))[1]   AS open_price,
                (ARRAY_AGG(price ORDER BY market_date DESC, id DESC))[1] AS close_price,
                COUNT(*)                                                 AS transaction_count
            FROM market_prices
            WHERE commodity = $1
              AND market_date BETWEEN $2 AND $3
            GROUP BY commodity, (market_date AT TIME ZONE 'UTC')::DATE
            ORDER BY date ASC
            "#,
        )
        .bind(commodity)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(days.into_iter().map(DailyAnalytics::with_movement).collect())
    }

    async fn create_price(&self, input: &PriceInput) -> RepoResult<MarketPrice> {
        let price = sqlx::query_as::<_, MarketPrice>(
            r#"
            INSERT INTO market_prices (
                commodity, price, currency, unit, change, change_percent, volume, high, low,
                open, close, market_date, source
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, COALESCE($12, NOW()), $13)
            RETURNING *
            "#,
        )
        .bind(input.commodity.trim())
        .bind(input.price)
        .bind(&input.currency)
        .bind(&input.unit)
        .bind(input.change)
        .bind(input.change_percent)
        .bind(input.volume)
        .bind(input.high)
        .bind(input.low)
        .bind(input.open)
        .bind(input.close)
        .bind(input.market_date)
        .bind(&input.source)
        .fetch_one(&self.pool)
        .await?;
        Ok(price)
    }

    async fn update_price(&self, id: i64, input: &PriceInput) -> RepoResult<Option<MarketPrice>> {
        let price = sqlx::query_as::<_, MarketPrice>(
            r#"
            UPDATE market_prices SET
                commodity = $2, price = $3, currency = $4, unit = $5, change = $6,
                change_percent = $7, volume = $8, high = $9, low = $10, open = $11,
                close = $12, market_date = COALESCE($13, market_date), source = $14,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.commodity.trim())
        .bind(input.price)
        .bind(&input.currency)
        .bind(&input.unit)
        .bind(input.change)
        .bind(input.change_percent)
        .bind(input.volume)
        .bind(input.high)
        .bind(input.low)
        .bind(input.open)
        .bind(input.close)
        .bind(input.market_date)
        .bind(&input.source)
        .fetch_optional(&self.pool)
        .await?;
        Ok(price)
    }

    async fn delete_price(&self, id: i64) -> RepoResult<bool> {
        self.delete_row("market_prices", id).await
    }

    async fn list_alerts(&self, user_id: i64) -> RepoResult<Vec<PriceAlert>> {
        let alerts = sqlx::query_as::<_, PriceAlert>(
            "SELECT * FROM price_alerts WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(alerts)
    }

    async fn get_alert(&self, id: i64) -> RepoResult<Option<PriceAlert>> {
        self.fetch_row("price_alerts", id).await
    }

    async fn create_alert(&self, user_id: i64, input: &AlertInput) -> RepoResult<PriceAlert> {
        let alert = sqlx::query_as::<_, PriceAlert>(
            r#"
            INSERT INTO price_alerts (user_id, commodity, target_price, condition, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(input.commodity.trim())
        .bind(input.target_price)
        .bind(&input.condition)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(alert)
    }

    async fn update_alert(&self, id: i64, input: &AlertInput) -> RepoResult<Option<PriceAlert>> {
        let alert = sqlx::query_as::<_, PriceAlert>(
            r#"
            UPDATE price_alerts SET
                commodity = $2, target_price = $3, condition = $4, is_active = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.commodity.trim())
        .bind(input.target_price)
        .bind(&input.condition)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(alert)
    }

    async fn delete_alert(&self, id: i64) -> RepoResult<bool> {
        self.delete_row("price_alerts", id).await
    }
}
