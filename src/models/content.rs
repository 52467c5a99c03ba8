use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

use super::{PageRequest, UnknownVariant, Validate, ValidationError, require};

pub const DEFAULT_TEMPLATE: &str = "default";

/// ContentStatus
///
/// Lifecycle state shared by pages and posts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ContentStatus {
    #[default]
    Draft,
    Published,
    Private,
    Archived,
}

impl ContentStatus {
    pub const ALL: [ContentStatus; 4] = [
        ContentStatus::Draft,
        ContentStatus::Published,
        ContentStatus::Private,
        ContentStatus::Archived,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Published => "published",
            ContentStatus::Private => "private",
            ContentStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "content status",
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for ContentStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Which slug namespace a record lives in. Pages and posts never collide with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Page,
    Post,
}

/// Publishable
///
/// Status transitions for pages and posts. Implementors expose their status and
/// publication timestamp; the provided methods keep the two consistent:
/// a published record always has `published_at`, a draft never does.
pub trait Publishable {
    fn status(&self) -> ContentStatus;
    fn published_at(&self) -> Option<DateTime<Utc>>;
    fn lifecycle_mut(&mut self) -> (&mut ContentStatus, &mut Option<DateTime<Utc>>);

    /// Publishing keeps an existing timestamp so re-publishing is idempotent.
    fn publish(&mut self, now: DateTime<Utc>) {
        let (status, published_at) = self.lifecycle_mut();
        *status = ContentStatus::Published;
        published_at.get_or_insert(now);
    }

    fn unpublish(&mut self) {
        let (status, published_at) = self.lifecycle_mut();
        *status = ContentStatus::Draft;
        *published_at = None;
    }

    fn archive(&mut self) {
        *self.lifecycle_mut().0 = ContentStatus::Archived;
    }

    /// Routes a requested status through the matching transition.
    fn apply_status(&mut self, target: ContentStatus, now: DateTime<Utc>) {
        match target {
            ContentStatus::Published => self.publish(now),
            ContentStatus::Draft => self.unpublish(),
            ContentStatus::Archived => self.archive(),
            ContentStatus::Private => *self.lifecycle_mut().0 = ContentStatus::Private,
        }
    }

    fn is_published(&self, now: DateTime<Utc>) -> bool {
        self.status() == ContentStatus::Published
            && self.published_at().is_some_and(|at| at <= now)
    }
}

/// Page
///
/// A CMS page from the `pages` table. Deletion is soft: `deleted_at` is set and the
/// row disappears from every read while its slug stays reserved.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export)]
pub struct Page {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub template: String,
    #[sqlx(try_from = "String")]
    pub status: ContentStatus,
    pub featured_image: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub parent_id: Option<i64>,
    pub sort_order: i32,
    pub author_id: i64,
    // Joined from users.
    #[sqlx(default)]
    pub author_name: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Publishable for Page {
    fn status(&self) -> ContentStatus {
        self.status
    }

    fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    fn lifecycle_mut(&mut self) -> (&mut ContentStatus, &mut Option<DateTime<Utc>>) {
        (&mut self.status, &mut self.published_at)
    }
}

/// BlogPost
///
/// A blog entry from the `blog_posts` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub featured_image: Option<String>,
    pub tags: Vec<String>,
    #[sqlx(try_from = "String")]
    pub status: ContentStatus,
    pub author_id: i64,
    #[sqlx(default)]
    pub author_name: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Publishable for BlogPost {
    fn status(&self) -> ContentStatus {
        self.status
    }

    fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    fn lifecycle_mut(&mut self) -> (&mut ContentStatus, &mut Option<DateTime<Utc>>) {
        (&mut self.status, &mut self.published_at)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct CreatePageRequest {
    pub title: String,
    /// Optional explicit slug; sanitized and de-duplicated like a generated one.
    pub slug: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    pub template: Option<String>,
    pub status: Option<ContentStatus>,
    pub featured_image: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub parent_id: Option<i64>,
    pub sort_order: Option<i32>,
}

impl Validate for CreatePageRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.title, "title")
    }
}

/// Partial page edit. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct UpdatePageRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub template: Option<String>,
    pub status: Option<ContentStatus>,
    pub featured_image: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub parent_id: Option<i64>,
    pub sort_order: Option<i32>,
}

impl Validate for UpdatePageRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        match &self.title {
            Some(title) => require(title, "title"),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct CreatePostRequest {
    pub title: String,
    pub slug: Option<String>,
    pub content: String,
    pub excerpt: String,
    pub featured_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: Option<ContentStatus>,
}

impl Validate for CreatePostRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.title, "title")?;
        require(&self.content, "content")?;
        require(&self.excerpt, "excerpt")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<ContentStatus>,
}

impl Validate for UpdatePostRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        for (value, field) in [(&self.title, "title"), (&self.content, "content")] {
            if let Some(value) = value {
                require(value, field)?;
            }
        }
        Ok(())
    }
}

/// ContentQuery
///
/// Query string accepted by page and post listings.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ContentQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Case-insensitive substring match on title and excerpt.
    pub search: Option<String>,
    pub status: Option<ContentStatus>,
    /// Posts only: exact tag match.
    pub tag: Option<String>,
    /// Pages only: children of the given page.
    pub parent_id: Option<i64>,
}

/// ContentFilter
///
/// Store-level filter derived from a `ContentQuery` plus the caller's scope.
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    pub page: PageRequest,
    pub search: Option<String>,
    pub status: Option<ContentStatus>,
    pub tag: Option<String>,
    pub parent_id: Option<i64>,
    /// Restricts results to one author. Set for every non-admin caller.
    pub author_id: Option<i64>,
    /// Public listings: published with a publication timestamp, newest first.
    pub published_only: bool,
}

impl ContentFilter {
    pub fn from_query(query: ContentQuery, author_id: Option<i64>) -> Self {
        Self {
            page: PageRequest::new(query.page, query.limit),
            search: query.search.filter(|s| !s.trim().is_empty()),
            status: query.status,
            tag: query.tag.filter(|t| !t.trim().is_empty()),
            parent_id: query.parent_id,
            author_id,
            published_only: false,
        }
    }

    pub fn published(query: ContentQuery) -> Self {
        Self {
            status: Some(ContentStatus::Published),
            published_only: true,
            author_id: None,
            ..Self::from_query(query, None)
        }
    }
}
