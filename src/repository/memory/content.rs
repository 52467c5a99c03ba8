use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{MemoryRepository, MemoryState, matches_search};
use crate::{
    models::{
        ActivityItem, BlogPost, ContentFilter, ContentKind, ContentStatus, DashboardStats, Page,
        Paginated,
    },
    repository::{ContentRepository, RepoError, RepoResult, constraints},
};

impl MemoryState {
    fn author_name(&self, author_id: i64) -> Option<String> {
        self.users.get(author_id).map(|user| user.name)
    }

    fn joined_page(&self, mut page: Page) -> Page {
        page.author_name = self.author_name(page.author_id);
        page
    }

    fn joined_post(&self, mut post: BlogPost) -> BlogPost {
        post.author_name = self.author_name(post.author_id);
        post
    }

    fn page_slug_taken(&self, slug: &str, exclude_id: Option<i64>) -> bool {
        self.pages
            .iter()
            .any(|page| page.slug == slug && Some(page.id) != exclude_id)
    }

    fn post_slug_taken(&self, slug: &str, exclude_id: Option<i64>) -> bool {
        self.posts
            .iter()
            .any(|post| post.slug == slug && Some(post.id) != exclude_id)
    }
}

fn shared_filters(
    filter: &ContentFilter,
    author_id: i64,
    status: ContentStatus,
    published_at: Option<DateTime<Utc>>,
    title: &str,
    excerpt: &str,
) -> bool {
    filter.author_id.is_none_or(|id| id == author_id)
        && filter.status.is_none_or(|wanted| wanted == status)
        && (!filter.published_only || published_at.is_some())
        && matches_search(filter.search.as_deref(), &[title, excerpt])
}

#[async_trait]
impl ContentRepository for MemoryRepository {
    async fn slug_exists(
        &self,
        kind: ContentKind,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> RepoResult<bool> {
        let state = self.read()?;
        Ok(match kind {
            ContentKind::Page => state.page_slug_taken(slug, exclude_id),
            ContentKind::Post => state.post_slug_taken(slug, exclude_id),
        })
    }

    async fn list_pages(&self, filter: &ContentFilter) -> RepoResult<Paginated<Page>> {
        let state = self.read()?;
        let mut pages: Vec<Page> = state
            .pages
            .iter()
            .filter(|page| page.deleted_at.is_none())
            .filter(|page| filter.parent_id.is_none_or(|id| page.parent_id == Some(id)))
            .filter(|page| {
                shared_filters(
                    filter,
                    page.author_id,
                    page.status,
                    page.published_at,
                    &page.title,
                    &page.excerpt,
                )
            })
            .map(|page| state.joined_page(page.clone()))
            .collect();
        if filter.published_only {
            pages.sort_by_key(|page| Reverse((page.published_at, page.id)));
        } else {
            pages.sort_by_key(|page| (page.sort_order, Reverse((page.created_at, page.id))));
        }
        Ok(filter.page.slice(pages))
    }

    async fn get_page(&self, id: i64) -> RepoResult<Option<Page>> {
        let state = self.read()?;
        Ok(state
            .pages
            .get(id)
            .filter(|page| page.deleted_at.is_none())
            .map(|page| state.joined_page(page)))
    }

    async fn get_page_by_slug(&self, slug: &str) -> RepoResult<Option<Page>> {
        let state = self.read()?;
        Ok(state
            .pages
            .iter()
            .find(|page| page.slug == slug && page.deleted_at.is_none())
            .map(|page| state.joined_page(page.clone())))
    }

    async fn insert_page(&self, page: &Page) -> RepoResult<Page> {
        let mut state = self.write()?;
        if state.page_slug_taken(&page.slug, None) {
            return Err(RepoError::conflict(constraints::PAGE_SLUG));
        }
        let created = state.pages.insert_with(|id| Page {
            id,
            author_name: None,
            deleted_at: None,
            updated_at: page.created_at,
            ..page.clone()
        });
        Ok(state.joined_page(created))
    }

    async fn update_page(&self, page: &Page) -> RepoResult<Option<Page>> {
        let mut state = self.write()?;
        if state.page_slug_taken(&page.slug, Some(page.id)) {
            return Err(RepoError::conflict(constraints::PAGE_SLUG));
        }
        let Some(stored) = state
            .pages
            .get_mut(page.id)
            .filter(|stored| stored.deleted_at.is_none())
        else {
            return Ok(None);
        };
        *stored = Page {
            author_id: stored.author_id,
            created_at: stored.created_at,
            deleted_at: None,
            author_name: None,
            ..page.clone()
        };
        let updated = stored.clone();
        Ok(Some(state.joined_page(updated)))
    }

    async fn soft_delete_page(&self, id: i64, at: DateTime<Utc>) -> RepoResult<bool> {
        let mut state = self.write()?;
        match state
            .pages
            .get_mut(id)
            .filter(|page| page.deleted_at.is_none())
        {
            Some(page) => {
                page.deleted_at = Some(at);
                page.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_posts(&self, filter: &ContentFilter) -> RepoResult<Paginated<BlogPost>> {
        let state = self.read()?;
        let mut posts: Vec<BlogPost> = state
            .posts
            .iter()
            .filter(|post| {
                filter
                    .tag
                    .as_ref()
                    .is_none_or(|tag| post.tags.iter().any(|t| t == tag))
            })
            .filter(|post| {
                shared_filters(
                    filter,
                    post.author_id,
                    post.status,
                    post.published_at,
                    &post.title,
                    &post.excerpt,
                )
            })
            .map(|post| state.joined_post(post.clone()))
            .collect();
        if filter.published_only {
            posts.sort_by_key(|post| Reverse((post.published_at, post.id)));
        } else {
            posts.sort_by_key(|post| Reverse((post.created_at, post.id)));
        }
        Ok(filter.page.slice(posts))
    }

    async fn get_post(&self, id: i64) -> RepoResult<Option<BlogPost>> {
        let state = self.read()?;
        Ok(state.posts.get(id).map(|post| state.joined_post(post)))
    }

    async fn get_post_by_slug(&self, slug: &str) -> RepoResult<Option<BlogPost>> {
        let state = self.read()?;
        Ok(state
            .posts
            .iter()
            .find(|post| post.slug == slug)
            .map(|post| state.joined_post(post.clone())))
    }

    async fn insert_post(&self, post: &BlogPost) -> RepoResult<BlogPost> {
        let mut state = self.write()?;
        if state.post_slug_taken(&post.slug, None) {
            return Err(RepoError::conflict(constraints::POST_SLUG));
        }
        let created = state.posts.insert_with(|id| BlogPost {
            id,
            author_name: None,
            updated_at: post.created_at,
            ..post.clone()
        });
        Ok(state.joined_post(created))
    }

    async fn update_post(&self, post: &BlogPost) -> RepoResult<Option<BlogPost>> {
        let mut state = self.write()?;
        if state.post_slug_taken(&post.slug, Some(post.id)) {
            return Err(RepoError::conflict(constraints::POST_SLUG));
        }
        let updated = state.posts.update(post.id, |stored| {
            *stored = BlogPost {
                author_id: stored.author_id,
                created_at: stored.created_at,
                author_name: None,
                ..post.clone()
            };
        });
        Ok(updated.map(|post| state.joined_post(post)))
    }

    async fn delete_post(&self, id: i64) -> RepoResult<bool> {
        Ok(self.write()?.posts.remove(id))
    }

    async fn content_stats(&self, author_id: Option<i64>) -> RepoResult<DashboardStats> {
        let state = self.read()?;
        let in_scope = |owner: i64| author_id.is_none_or(|id| id == owner);
        let posts: Vec<ContentStatus> = state
            .posts
            .iter()
            .filter(|post| in_scope(post.author_id))
            .map(|post| post.status)
            .collect();
        let pages: Vec<ContentStatus> = state
            .pages
            .iter()
            .filter(|page| page.deleted_at.is_none() && in_scope(page.author_id))
            .map(|page| page.status)
            .collect();
        let count = |statuses: &[ContentStatus], wanted: ContentStatus| {
            statuses.iter().filter(|status| **status == wanted).count() as i64
        };

        Ok(DashboardStats {
            total_posts: posts.len() as i64,
            published_posts: count(&posts, ContentStatus::Published),
            draft_posts: count(&posts, ContentStatus::Draft),
            total_pages: pages.len() as i64,
            published_pages: count(&pages, ContentStatus::Published),
            draft_pages: count(&pages, ContentStatus::Draft),
            media_files: 0,
        })
    }

    async fn recent_activity(
        &self,
        author_id: Option<i64>,
        limit: i64,
    ) -> RepoResult<Vec<ActivityItem>> {
        let state = self.read()?;
        let in_scope = |owner: i64| author_id.is_none_or(|id| id == owner);
        let posts = state
            .posts
            .iter()
            .filter(|post| in_scope(post.author_id))
            .map(|post| ActivityItem {
                id: post.id,
                kind: "post".to_string(),
                title: post.title.clone(),
                status: post.status.as_str().to_string(),
                updated_at: post.updated_at,
            });
        let pages = state
            .pages
            .iter()
            .filter(|page| page.deleted_at.is_none() && in_scope(page.author_id))
            .map(|page| ActivityItem {
                id: page.id,
                kind: "page".to_string(),
                title: page.title.clone(),
                status: page.status.as_str().to_string(),
                updated_at: page.updated_at,
            });
        let mut items: Vec<ActivityItem> = posts.chain(pages).collect();
        items.sort_by_key(|item| Reverse(item.updated_at));
        items.truncate(usize::try_from(limit.max(0)).unwrap_or(0));
        Ok(items)
    }
}
