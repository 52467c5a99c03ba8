use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

/// DashboardStats
///
/// Content counters for the CMS landing screen. Scoped to the caller's own content
/// unless the caller is an administrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct DashboardStats {
    pub total_posts: i64,
    pub published_posts: i64,
    pub draft_posts: i64,
    pub total_pages: i64,
    pub published_pages: i64,
    pub draft_pages: i64,
    pub media_files: i64,
}

/// A recently touched page or post.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export)]
pub struct ActivityItem {
    pub id: i64,
    /// "page" or "post".
    pub kind: String,
    pub title: String,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}
