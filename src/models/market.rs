use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

use super::{Validate, ValidationError, require, require_one_of};

pub const DEFAULT_CURRENCY: &str = "GHS";
pub const ALERT_CONDITIONS: [&str; 2] = ["above", "below"];

/// Look-back used when a price window is not given.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// A day moving more than this many percent either way is bullish or bearish.
pub const SENTIMENT_BAND_PERCENT: f64 = 1.0;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Subscription states. Only one `active` subscription may exist per user.
pub mod subscription_status {
    pub const ACTIVE: &str = "active";
    pub const CANCELLED: &str = "cancelled";
    pub const EXPIRED: &str = "expired";
}

/// SubscriptionPlan
///
/// A purchasable market-data package.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export)]
pub struct SubscriptionPlan {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub currency: String,
    pub duration_days: i32,
    pub features: Vec<String>,
    pub max_users: i32,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct PlanInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub duration_days: i32,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default = "single_user")]
    pub max_users: i32,
    #[serde(default = "enabled")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

impl Validate for PlanInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.name, "name")?;
        if self.price < 0.0 {
            return Err(ValidationError::new("price cannot be negative"));
        }
        if self.duration_days <= 0 {
            return Err(ValidationError::new("duration_days must be positive"));
        }
        if self.max_users <= 0 {
            return Err(ValidationError::new("max_users must be positive"));
        }
        Ok(())
    }
}

/// UserSubscription
///
/// A user's purchase of a plan. `plan` is attached when the record is read back
/// for its owner.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export)]
pub struct UserSubscription {
    pub id: i64,
    pub user_id: i64,
    pub plan_id: i64,
    pub status: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub auto_renew: bool,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub amount_paid: f64,
    pub currency: String,
    #[sqlx(skip)]
    pub plan: Option<SubscriptionPlan>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert shape built by the subscribe handler once the plan has been resolved.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub user_id: i64,
    pub plan_id: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub auto_renew: bool,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub amount_paid: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct SubscribeRequest {
    pub plan_id: i64,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    #[serde(default)]
    pub auto_renew: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct UpdateSubscriptionRequest {
    pub auto_renew: Option<bool>,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
}

/// MarketPrice
///
/// One dated price observation for a commodity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export)]
pub struct MarketPrice {
    pub id: i64,
    pub commodity: String,
    pub price: f64,
    pub currency: String,
    pub unit: String,
    pub change: f64,
    pub change_percent: f64,
    pub volume: f64,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub close: f64,
    pub market_date: DateTime<Utc>,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct PriceInput {
    pub commodity: String,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub change: f64,
    #[serde(default)]
    pub change_percent: f64,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub high: f64,
    #[serde(default)]
    pub low: f64,
    #[serde(default)]
    pub open: f64,
    #[serde(default)]
    pub close: f64,
    pub market_date: Option<DateTime<Utc>>,
    #[serde(default = "default_source")]
    pub source: String,
}

impl Validate for PriceInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.commodity, "commodity")?;
        if self.price < 0.0 {
            return Err(ValidationError::new("price cannot be negative"));
        }
        if self.high < self.low {
            return Err(ValidationError::new("high cannot be below low"));
        }
        Ok(())
    }
}

/// PriceAlert
///
/// A user's threshold on a commodity price.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export)]
pub struct PriceAlert {
    pub id: i64,
    pub user_id: i64,
    pub commodity: String,
    pub target_price: f64,
    pub condition: String,
    pub is_active: bool,
    pub triggered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct AlertInput {
    pub commodity: String,
    pub target_price: f64,
    pub condition: String,
    #[serde(default = "enabled")]
    pub is_active: bool,
}

impl Validate for AlertInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.commodity, "commodity")?;
        if self.target_price <= 0.0 {
            return Err(ValidationError::new("target_price must be positive"));
        }
        require_one_of(&self.condition, &ALERT_CONDITIONS, "condition")
    }
}

/// HistoryQuery
///
/// Window for price history. Defaults to the last 30 days.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct HistoryQuery {
    pub commodity: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Thirty-day digest for one commodity.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct MarketSummary {
    pub commodity: String,
    pub latest: MarketPrice,
    pub high: f64,
    pub low: f64,
    pub average: f64,
    pub data_points: usize,
}

impl MarketSummary {
    /// Builds the digest from observations ordered oldest first. `None` when empty.
    pub fn from_prices(commodity: &str, prices: &[MarketPrice]) -> Option<Self> {
        let latest = prices.last()?.clone();
        let high = prices.iter().map(|p| p.price).fold(f64::MIN, f64::max);
        let low = prices.iter().map(|p| p.price).fold(f64::MAX, f64::min);
        let average = prices.iter().map(|p| p.price).sum::<f64>() / prices.len() as f64;
        Some(Self {
            commodity: commodity.to_string(),
            latest,
            high,
            low,
            average,
            data_points: prices.len(),
        })
    }
}

/// AnalyticsQuery
///
/// `commodity` is required. Dates are `YYYY-MM-DD`; `end_date` covers that whole
/// day.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct AnalyticsQuery {
    pub commodity: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Resolved bounds of an analytics request.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsWindow {
    pub commodity: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AnalyticsQuery {
    /// Resolves the request against `now`. Missing bounds fall back to the last
    /// thirty days.
    pub fn window(&self, now: DateTime<Utc>) -> Result<AnalyticsWindow, ValidationError> {
        let commodity = self
            .commodity
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ValidationError::new("Commodity parameter is required"))?;

        let end = match non_blank(&self.end_date) {
            Some(day) => {
                let next_day = parse_day(day, "end_date")? + Duration::days(1);
                start_of(next_day) - Duration::microseconds(1)
            }
            None => now,
        };
        let start = match non_blank(&self.start_date) {
            Some(day) => start_of(parse_day(day, "start_date")?),
            None => now - Duration::days(DEFAULT_WINDOW_DAYS),
        };
        if start > end {
            return Err(ValidationError::new("start_date must not be after end_date"));
        }

        Ok(AnalyticsWindow {
            commodity: commodity.to_string(),
            start,
            end,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_day(value: &str, field: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, DAY_FORMAT)
        .map_err(|_| ValidationError::new(format!("Invalid {field} format. Use YYYY-MM-DD")))
}

fn start_of(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// DailyAnalytics
///
/// One UTC day of a commodity, aggregated from its price observations. The
/// movement fields are derived from the open and close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export)]
pub struct DailyAnalytics {
    pub commodity: String,
    pub date: NaiveDate,
    pub total_volume: f64,
    pub average_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub open_price: f64,
    pub close_price: f64,
    #[sqlx(default)]
    pub price_change: f64,
    #[sqlx(default)]
    pub price_change_percent: f64,
    pub transaction_count: i64,
    #[sqlx(default)]
    pub market_sentiment: String,
}

impl DailyAnalytics {
    /// Groups observations ordered oldest first into one entry per commodity and day.
    pub fn from_prices(prices: &[MarketPrice]) -> Vec<Self> {
        prices
            .chunk_by(|a, b| {
                a.commodity == b.commodity
                    && a.market_date.date_naive() == b.market_date.date_naive()
            })
            .filter_map(|day| {
                let (first, last) = (day.first()?, day.last()?);
                let count = day.len();
                Some(
                    Self {
                        commodity: first.commodity.clone(),
                        date: first.market_date.date_naive(),
                        total_volume: day.iter().map(|p| p.volume).sum(),
                        average_price: day.iter().map(|p| p.price).sum::<f64>() / count as f64,
                        high_price: day.iter().map(|p| p.price).fold(f64::MIN, f64::max),
                        low_price: day.iter().map(|p| p.price).fold(f64::MAX, f64::min),
                        open_price: first.price,
                        close_price: last.price,
                        price_change: 0.0,
                        price_change_percent: 0.0,
                        transaction_count: count as i64,
                        market_sentiment: String::new(),
                    }
                    .with_movement(),
                )
            })
            .collect()
    }

    /// Fills `price_change`, `price_change_percent` and `market_sentiment`.
    pub fn with_movement(mut self) -> Self {
        self.price_change = self.close_price - self.open_price;
        self.price_change_percent = if self.open_price == 0.0 {
            0.0
        } else {
            self.price_change / self.open_price * 100.0
        };
        self.market_sentiment = sentiment(self.price_change_percent).to_string();
        self
    }
}

pub fn sentiment(change_percent: f64) -> &'static str {
    if change_percent > SENTIMENT_BAND_PERCENT {
        "bullish"
    } else if change_percent < -SENTIMENT_BAND_PERCENT {
        "bearish"
    } else {
        "neutral"
    }
}

/// Response of the analytics endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct MarketAnalytics {
    pub commodity: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub data: Vec<DailyAnalytics>,
    pub count: usize,
}

impl MarketAnalytics {
    pub fn new(window: AnalyticsWindow, data: Vec<DailyAnalytics>) -> Self {
        Self {
            commodity: window.commodity,
            start_date: window.start,
            end_date: window.end,
            count: data.len(),
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct RealtimeSnapshot {
    pub as_of: DateTime<Utc>,
    pub prices: Vec<MarketPrice>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_source() -> String {
    "manual".to_string()
}

fn single_user() -> i32 {
    1
}

fn enabled() -> bool {
    true
}
