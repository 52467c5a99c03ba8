use std::{cmp::Reverse, collections::BTreeMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{MemoryRepository, MemoryState};
use crate::{
    models::market::{
        AlertInput, DailyAnalytics, MarketPrice, NewSubscription, PlanInput, PriceAlert,
        PriceInput, SubscriptionPlan, UpdateSubscriptionRequest, UserSubscription,
        subscription_status,
    },
    repository::{MarketRepository, RepoError, RepoResult, constraints},
};

impl MemoryState {
    fn with_plan(&self, mut subscription: UserSubscription) -> UserSubscription {
        subscription.plan = self.plans.get(subscription.plan_id);
        subscription
    }
}

fn apply_price(price: &mut MarketPrice, input: &PriceInput) {
    price.commodity = input.commodity.trim().to_string();
    price.price = input.price;
    price.currency.clone_from(&input.currency);
    price.unit.clone_from(&input.unit);
    price.change = input.change;
    price.change_percent = input.change_percent;
    price.volume = input.volume;
    price.high = input.high;
    price.low = input.low;
    price.open = input.open;
    price.close = input.close;
    if let Some(market_date) = input.market_date {
        price.market_date = market_date;
    }
    price.source.clone_from(&input.source);
}

fn apply_plan(plan: &mut SubscriptionPlan, input: &PlanInput) {
    plan.name = input.name.trim().to_string();
    plan.description.clone_from(&input.description);
    plan.price = input.price;
    plan.currency.clone_from(&input.currency);
    plan.duration_days = input.duration_days;
    plan.features.clone_from(&input.features);
    plan.max_users = input.max_users;
    plan.is_active = input.is_active;
    plan.sort_order = input.sort_order;
}

fn apply_alert(alert: &mut PriceAlert, input: &AlertInput) {
    alert.commodity = input.commodity.trim().to_string();
    alert.target_price = input.target_price;
    alert.condition.clone_from(&input.condition);
    alert.is_active = input.is_active;
}

#[async_trait]
impl MarketRepository for MemoryRepository {
    async fn list_plans(&self, active_only: bool) -> RepoResult<Vec<SubscriptionPlan>> {
        let mut plans: Vec<SubscriptionPlan> = self
            .read()?
            .plans
            .iter()
            .filter(|plan| !active_only || plan.is_active)
            .cloned()
            .collect();
        plans.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then(a.price.total_cmp(&b.price))
                .then(a.id.cmp(&b.id))
        });
        Ok(plans)
    }

    async fn get_plan(&self, id: i64) -> RepoResult<Option<SubscriptionPlan>> {
        Ok(self.read()?.plans.get(id))
    }

    async fn create_plan(&self, input: &PlanInput) -> RepoResult<SubscriptionPlan> {
        let now = Utc::now();
        Ok(self.write()?.plans.insert_with(|id| {
            let mut plan = SubscriptionPlan {
                id,
                name: String::new(),
                description: String::new(),
                price: 0.0,
                currency: String::new(),
                duration_days: 0,
                features: Vec::new(),
                max_users: 0,
                is_active: false,
                sort_order: 0,
                created_at: now,
                updated_at: now,
            };
            apply_plan(&mut plan, input);
            plan
        }))
    }

    async fn update_plan(
        &self,
        id: i64,
        input: &PlanInput,
    ) -> RepoResult<Option<SubscriptionPlan>> {
        Ok(self.write()?.plans.update(id, |plan| {
            apply_plan(plan, input);
            plan.updated_at = Utc::now();
        }))
    }

    async fn delete_plan(&self, id: i64) -> RepoResult<bool> {
        let mut state = self.write()?;
        if state
            .subscriptions
            .iter()
            .any(|subscription| subscription.plan_id == id)
        {
            return Err(RepoError::check_failed(constraints::SUBSCRIPTION_PLAN));
        }
        Ok(state.plans.remove(id))
    }

    async fn active_subscription(&self, user_id: i64) -> RepoResult<Option<UserSubscription>> {
        let state = self.read()?;
        Ok(state
            .subscriptions
            .iter()
            .find(|s| s.user_id == user_id && s.status == subscription_status::ACTIVE)
            .map(|subscription| state.with_plan(subscription.clone())))
    }

    async fn create_subscription(&self, new: &NewSubscription) -> RepoResult<UserSubscription> {
        let mut state = self.write()?;
        if state
            .subscriptions
            .iter()
            .any(|s| s.user_id == new.user_id && s.status == subscription_status::ACTIVE)
        {
            return Err(RepoError::conflict(constraints::ACTIVE_SUBSCRIPTION));
        }
        if state.plans.get(new.plan_id).is_none() || state.users.get(new.user_id).is_none() {
            return Err(RepoError::Constraint(
                "Referenced record does not exist".to_string(),
            ));
        }
        let now = Utc::now();
        let created = state.subscriptions.insert_with(|id| UserSubscription {
            id,
            user_id: new.user_id,
            plan_id: new.plan_id,
            status: subscription_status::ACTIVE.to_string(),
            start_date: new.start_date,
            end_date: new.end_date,
            auto_renew: new.auto_renew,
            payment_method: new.payment_method.clone(),
            payment_reference: new.payment_reference.clone(),
            amount_paid: new.amount_paid,
            currency: new.currency.clone(),
            plan: None,
            created_at: now,
            updated_at: now,
        });
        Ok(state.with_plan(created))
    }

    async fn get_subscription(&self, id: i64) -> RepoResult<Option<UserSubscription>> {
        let state = self.read()?;
        Ok(state
            .subscriptions
            .get(id)
            .map(|subscription| state.with_plan(subscription)))
    }

    async fn update_subscription(
        &self,
        id: i64,
        changes: &UpdateSubscriptionRequest,
    ) -> RepoResult<Option<UserSubscription>> {
        let mut state = self.write()?;
        let updated = state.subscriptions.update(id, |subscription| {
            if let Some(auto_renew) = changes.auto_renew {
                subscription.auto_renew = auto_renew;
            }
            if changes.payment_method.is_some() {
                subscription.payment_method.clone_from(&changes.payment_method);
            }
            if changes.payment_reference.is_some() {
                subscription
                    .payment_reference
                    .clone_from(&changes.payment_reference);
            }
            subscription.updated_at = Utc::now();
        });
        Ok(updated.map(|subscription| state.with_plan(subscription)))
    }

    async fn cancel_subscription(&self, id: i64) -> RepoResult<Option<UserSubscription>> {
        let mut state = self.write()?;
        let cancelled = state.subscriptions.update(id, |subscription| {
            subscription.status = subscription_status::CANCELLED.to_string();
            subscription.auto_renew = false;
            subscription.updated_at = Utc::now();
        });
        Ok(cancelled.map(|subscription| state.with_plan(subscription)))
    }

    async fn latest_prices(&self) -> RepoResult<Vec<MarketPrice>> {
        let state = self.read()?;
        let mut latest: BTreeMap<&str, &MarketPrice> = BTreeMap::new();
        for price in state.prices.iter() {
            let newer = latest
                .get(price.commodity.as_str())
                .is_none_or(|seen| (price.market_date, price.id) > (seen.market_date, seen.id));
            if newer {
                latest.insert(&price.commodity, price);
            }
        }
        Ok(latest.into_values().cloned().collect())
    }

    async fn prices_between(
        &self,
        commodity: Option<&str>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Vec<MarketPrice>> {
        let mut prices: Vec<MarketPrice> = self
            .read()?
            .prices
            .iter()
            .filter(|price| commodity.is_none_or(|c| price.commodity == c))
            .filter(|price| price.market_date >= start && price.market_date <= end)
            .cloned()
            .collect();
        prices.sort_by_key(|price| (price.market_date, price.id));
        Ok(prices)
    }

    async fn daily_analytics(
        &self,
        commodity: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Vec<DailyAnalytics>> {
        let prices = self.prices_between(Some(commodity), start, end).await?;
        Ok(DailyAnalytics::from_prices(&prices))
    }

    async fn create_price(&self, input: &PriceInput) -> RepoResult<MarketPrice> {
        let now = Utc::now();
        Ok(self.write()?.prices.insert_with(|id| {
            let mut price = MarketPrice {
                id,
                commodity: String::new(),
                price: 0.0,
                currency: String::new(),
                unit: String::new(),
                change: 0.0,
                change_percent: 0.0,
                volume: 0.0,
                high: 0.0,
                low: 0.0,
                open: 0.0,
                close: 0.0,
                market_date: now,
                source: String::new(),
                created_at: now,
                updated_at: now,
            };
            apply_price(&mut price, input);
            price
        }))
    }

    async fn update_price(&self, id: i64, input: &PriceInput) -> RepoResult<Option<MarketPrice>> {
        Ok(self.write()?.prices.update(id, |price| {
            apply_price(price, input);
            price.updated_at = Utc::now();
        }))
    }

    async fn delete_price(&self, id: i64) -> RepoResult<bool> {
        Ok(self.write()?.prices.remove(id))
    }

    async fn list_alerts(&self, user_id: i64) -> RepoResult<Vec<PriceAlert>> {
        let mut alerts: Vec<PriceAlert> = self
            .read()?
            .alerts
            .iter()
            .filter(|alert| alert.user_id == user_id)
            .cloned()
            .collect();
        alerts.sort_by_key(|alert| Reverse((alert.created_at, alert.id)));
        Ok(alerts)
    }

    async fn get_alert(&self, id: i64) -> RepoResult<Option<PriceAlert>> {
        Ok(self.read()?.alerts.get(id))
    }

    async fn create_alert(&self, user_id: i64, input: &AlertInput) -> RepoResult<PriceAlert> {
        let now = Utc::now();
        Ok(self.write()?.alerts.insert_with(|id| {
            let mut alert = PriceAlert {
                id,
                user_id,
                commodity: String::new(),
                target_price: 0.0,
                condition: String::new(),
                is_active: true,
                triggered_at: None,
                created_at: now,
                updated_at: now,
            };
            apply_alert(&mut alert, input);
            alert
        }))
    }

    async fn update_alert(&self, id: i64, input: &AlertInput) -> RepoResult<Option<PriceAlert>> {
        Ok(self.write()?.alerts.update(id, |alert| {
            apply_alert(alert, input);
            alert.updated_at = Utc::now();
        }))
    }

    async fn delete_alert(&self, id: i64) -> RepoResult<bool> {
        Ok(self.write()?.alerts.remove(id))
    }
}
