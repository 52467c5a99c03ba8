use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

use super::{Validate, ValidationError, require};

pub const DEFAULT_TARGET: &str = "_self";

/// Menu
///
/// A navigation menu bound to a site location ("header", "footer", ...).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export)]
pub struct Menu {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub is_active: bool,
    #[sqlx(skip)]
    pub items: Vec<MenuItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// MenuItem
///
/// One link in a menu. Items may nest through `parent_id`; `children` is filled
/// when a menu is assembled for display.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export)]
pub struct MenuItem {
    pub id: i64,
    pub menu_id: i64,
    pub parent_id: Option<i64>,
    pub label: String,
    pub url: String,
    pub target: String,
    pub icon_class: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    #[sqlx(skip)]
    #[serde(default)]
    #[schema(no_recursion)]
    pub children: Vec<MenuItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct MenuInput {
    pub name: String,
    pub location: String,
    #[serde(default = "enabled")]
    pub is_active: bool,
}

impl Validate for MenuInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.name, "name")?;
        require(&self.location, "location")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct MenuItemInput {
    pub label: String,
    pub url: String,
    #[serde(default = "default_target")]
    pub target: String,
    pub icon_class: Option<String>,
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "enabled")]
    pub is_active: bool,
}

impl Validate for MenuItemInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.label, "label")?;
        require(&self.url, "url")
    }
}

/// Arranges a flat item list into a tree ordered by `sort_order`.
/// Items whose parent is absent from the list are promoted to the top level.
pub fn nest_items(mut items: Vec<MenuItem>) -> Vec<MenuItem> {
    items.sort_by_key(|item| (item.sort_order, item.id));
    let known: HashSet<i64> = items.iter().map(|item| item.id).collect();

    let mut by_parent: HashMap<Option<i64>, Vec<MenuItem>> = HashMap::new();
    for item in items {
        let parent = item.parent_id.filter(|id| known.contains(id));
        by_parent.entry(parent).or_default().push(item);
    }

    attach(None, &mut by_parent)
}

fn attach(parent: Option<i64>, by_parent: &mut HashMap<Option<i64>, Vec<MenuItem>>) -> Vec<MenuItem> {
    let mut level = by_parent.remove(&parent).unwrap_or_default();
    for item in &mut level {
        item.children = attach(Some(item.id), by_parent);
    }
    level
}

fn enabled() -> bool {
    true
}

fn default_target() -> String {
    DEFAULT_TARGET.to_string()
}
