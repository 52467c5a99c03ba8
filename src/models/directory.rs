//! Listing-style records shown on the public site: people, members, partners,
//! publications, vacancies and commodities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

use super::{PageRequest, Validate, ValidationError, looks_like_email, require, require_one_of};

pub const TEAM_TYPES: [&str; 3] = ["board", "executive", "functional"];
pub const MEMBER_STATUSES: [&str; 3] = ["Active", "Inactive", "Suspended"];
pub const PARTNER_STATUSES: [&str; 2] = ["active", "inactive"];
pub const PUBLICATION_STATUSES: [&str; 3] = ["draft", "published", "archived"];
pub const CAREER_STATUSES: [&str; 3] = ["Open", "Closed", "Draft"];
pub const EMPLOYMENT_TYPES: [&str; 5] = [
    "Full-time",
    "Part-time",
    "Contract",
    "Internship",
    "Temporary",
];
pub const MARKET_STATUSES: [&str; 3] = ["open", "closed", "suspended"];

/// DirectoryQuery
///
/// Query string shared by every directory listing. Each listing honours the
/// filters that apply to its records and ignores the rest.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct DirectoryQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Case-insensitive substring match on the record's descriptive columns.
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    /// Team members: board | executive | functional.
    #[serde(rename = "type")]
    pub member_type: Option<String>,
    /// Traders: membership class.
    #[serde(rename = "member_type")]
    pub trader_type: Option<String>,
    /// Brokers: area of specialization.
    pub specialization: Option<String>,
}

/// Store-level directory filter: the query with blank values dropped.
#[derive(Debug, Clone, Default)]
pub struct DirectoryFilter {
    pub page: PageRequest,
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub member_type: Option<String>,
    pub trader_type: Option<String>,
    pub specialization: Option<String>,
}

impl From<DirectoryQuery> for DirectoryFilter {
    fn from(query: DirectoryQuery) -> Self {
        let keep = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        Self {
            page: PageRequest::new(query.page, query.limit),
            search: keep(query.search),
            category: keep(query.category),
            status: keep(query.status),
            member_type: keep(query.member_type),
            trader_type: keep(query.trader_type),
            specialization: keep(query.specialization),
        }
    }
}

impl DirectoryFilter {
    /// Forces the status filter, used by public listings that only show live records.
    pub fn with_status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }
}

/// Ordered position update for team and board members.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct ReorderEntry {
    pub id: i64,
    #[serde(alias = "order")]
    pub order_index: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct ReorderRequest {
    pub members: Vec<ReorderEntry>,
}

// --- Team members ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export)]
pub struct TeamMember {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub member_type: String,
    pub order_index: i32,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub facebook_url: Option<String>,
    pub instagram_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct TeamMemberInput {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub image: Option<String>,
    #[serde(rename = "type", default = "default_team_type")]
    pub member_type: String,
    /// Appended after the last member of the same type when absent.
    pub order_index: Option<i32>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub facebook_url: Option<String>,
    pub instagram_url: Option<String>,
}

impl Validate for TeamMemberInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.name, "name")?;
        require_one_of(&self.member_type, &TEAM_TYPES, "type")
    }
}

// --- Board members ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export)]
pub struct BoardMember {
    pub id: i64,
    pub name: String,
    pub position: String,
    pub image: Option<String>,
    pub description: String,
    pub linkedin: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct BoardMemberInput {
    pub name: String,
    #[serde(default)]
    pub position: String,
    pub image: Option<String>,
    #[serde(default)]
    pub description: String,
    pub linkedin: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub order_index: Option<i32>,
}

impl Validate for BoardMemberInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.name, "name")?;
        require(&self.position, "position")
    }
}

// --- Traders ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export)]
pub struct Trader {
    pub id: i64,
    pub name: String,
    pub industry: String,
    pub member_type: String,
    pub phone_no: String,
    pub email: String,
    pub address: String,
    pub registration_date: Option<DateTime<Utc>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct TraderInput {
    pub name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub member_type: String,
    #[serde(default)]
    pub phone_no: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    pub registration_date: Option<DateTime<Utc>>,
    #[serde(default = "default_member_status")]
    pub status: String,
}

impl Validate for TraderInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.name, "name")?;
        optional_email(&self.email)?;
        require_one_of(&self.status, &MEMBER_STATUSES, "status")
    }
}

// --- Brokers ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export)]
pub struct Broker {
    pub id: i64,
    pub name: String,
    pub company: String,
    pub license_number: String,
    pub phone_no: String,
    pub email: String,
    pub address: String,
    pub specialization: String,
    pub experience_years: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct BrokerInput {
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub license_number: String,
    #[serde(default)]
    pub phone_no: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub experience_years: i32,
    #[serde(default = "default_member_status")]
    pub status: String,
}

impl Validate for BrokerInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.name, "name")?;
        optional_email(&self.email)?;
        if self.experience_years < 0 {
            return Err(ValidationError::new("experience_years cannot be negative"));
        }
        require_one_of(&self.status, &MEMBER_STATUSES, "status")
    }
}

// --- Partners ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export)]
pub struct Partner {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct PartnerInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub logo: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default = "default_partner_status")]
    pub status: String,
}

impl Validate for PartnerInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.name, "name")?;
        optional_email(&self.email)?;
        require_one_of(&self.status, &PARTNER_STATUSES, "status")
    }
}

// --- Publications ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export)]
pub struct Publication {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub file_path: String,
    pub file_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub publication_date: Option<DateTime<Utc>>,
    pub author: String,
    pub tags: Vec<String>,
    pub status: String,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct PublicationInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_size: i64,
    #[serde(default)]
    pub file_type: String,
    pub publication_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_publication_status")]
    pub status: String,
}

impl Validate for PublicationInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.title, "title")?;
        if self.file_size < 0 {
            return Err(ValidationError::new("file_size cannot be negative"));
        }
        require_one_of(&self.status, &PUBLICATION_STATUSES, "status")
    }
}

// --- Careers ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export)]
pub struct Career {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub department: String,
    pub location: String,
    pub employment_type: String,
    pub experience_level: String,
    pub requirements: String,
    pub responsibilities: String,
    pub benefits: String,
    pub salary_range: String,
    pub application_deadline: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub status: String,
    pub application_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct CareerInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub location: String,
    #[serde(default = "default_employment_type")]
    pub employment_type: String,
    #[serde(default)]
    pub experience_level: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub responsibilities: String,
    #[serde(default)]
    pub benefits: String,
    #[serde(default)]
    pub salary_range: String,
    pub application_deadline: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default = "default_career_status")]
    pub status: String,
}

impl Validate for CareerInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.title, "title")?;
        require_one_of(&self.employment_type, &EMPLOYMENT_TYPES, "employment_type")?;
        require_one_of(&self.status, &CAREER_STATUSES, "status")
    }
}

// --- Commodities ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export)]
pub struct Commodity {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub description: String,
    pub category: String,
    pub unit: String,
    pub current_price: f64,
    pub previous_price: f64,
    pub price_change: f64,
    pub change_percent: f64,
    pub market_status: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Commodity {
    /// Recomputes the day-on-day movement from the two stored prices.
    pub fn refresh_change(&mut self) {
        self.price_change = self.current_price - self.previous_price;
        self.change_percent = if self.previous_price == 0.0 {
            0.0
        } else {
            self.price_change / self.previous_price * 100.0
        };
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct CommodityInput {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub current_price: f64,
    #[serde(default)]
    pub previous_price: f64,
    #[serde(default = "default_market_status")]
    pub market_status: String,
    #[serde(default = "enabled")]
    pub is_active: bool,
}

impl Validate for CommodityInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.name, "name")?;
        require(&self.code, "code")?;
        if self.current_price < 0.0 || self.previous_price < 0.0 {
            return Err(ValidationError::new("prices cannot be negative"));
        }
        require_one_of(&self.market_status, &MARKET_STATUSES, "market_status")
    }
}

fn optional_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || looks_like_email(email) {
        return Ok(());
    }
    Err(ValidationError::new("email is not a valid address"))
}

fn default_team_type() -> String {
    "executive".to_string()
}

fn default_member_status() -> String {
    "Active".to_string()
}

fn default_partner_status() -> String {
    "active".to_string()
}

fn default_publication_status() -> String {
    "published".to_string()
}

fn default_career_status() -> String {
    "Open".to_string()
}

fn default_employment_type() -> String {
    "Full-time".to_string()
}

fn default_market_status() -> String {
    "open".to_string()
}

fn enabled() -> bool {
    true
}
