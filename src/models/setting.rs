use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

use super::{Validate, ValidationError, require};

/// Type tags accepted by the `settings.setting_type` check constraint.
pub const SETTING_TYPES: [&str; 9] = [
    "string", "number", "boolean", "json", "text", "url", "email", "color", "image",
];

pub const DEFAULT_GROUP: &str = "general";

/// Groups the public site reads through dedicated shortcut routes.
pub const PUBLIC_GROUPS: [&str; 5] = ["hero", "services", "why_join", "cta", "market_data"];

pub fn is_known_type(setting_type: &str) -> bool {
    SETTING_TYPES.contains(&setting_type)
}

/// Setting
///
/// A key/value site setting. The key is unique and immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export)]
pub struct Setting {
    pub id: i64,
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub setting_type: String,
    #[sqlx(rename = "setting_group")]
    pub group: String,
    pub label: String,
    pub description: String,
    pub is_public: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct CreateSettingRequest {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "type", default = "default_type")]
    pub setting_type: String,
    #[serde(default = "default_group")]
    pub group: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub sort_order: i32,
}

impl Validate for CreateSettingRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.key, "key")
    }
}

/// Editable setting fields. The key travels in the path and cannot change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct UpdateSettingRequest {
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub setting_type: Option<String>,
    pub group: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub sort_order: Option<i32>,
}

/// One entry of a batch update, addressed by key. Metadata left out of the entry
/// keeps its stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct SettingBatchItem {
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub setting_type: Option<String>,
    pub group: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub sort_order: Option<i32>,
}

/// BatchUpdateRequest
///
/// The admin editor sends a bare array of entries; `{"settings": [...]}` is
/// accepted as well.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum BatchUpdateRequest {
    Items(Vec<SettingBatchItem>),
    Wrapped { settings: Vec<SettingBatchItem> },
}

impl BatchUpdateRequest {
    pub fn items(&self) -> &[SettingBatchItem] {
        match self {
            BatchUpdateRequest::Items(items) => items,
            BatchUpdateRequest::Wrapped { settings } => settings,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct BatchUpdateResponse {
    pub message: String,
    /// Rows actually changed; keys that do not exist are skipped silently.
    pub updated: u64,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct SettingQuery {
    pub group: Option<String>,
    pub is_public: Option<bool>,
}

fn default_type() -> String {
    "string".to_string()
}

fn default_group() -> String {
    DEFAULT_GROUP.to_string()
}
