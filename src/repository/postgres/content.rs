use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};

use super::{PostgresRepository, push_search, push_window};
use crate::{
    models::{
        ActivityItem, BlogPost, ContentFilter, ContentKind, DashboardStats, Page, Paginated,
    },
    repository::{ContentRepository, RepoResult},
};

const PAGE_SELECT: &str =
    "SELECT p.*, u.name AS author_name FROM pages p LEFT JOIN users u ON u.id = p.author_id";
const POST_SELECT: &str =
    "SELECT p.*, u.name AS author_name FROM blog_posts p LEFT JOIN users u ON u.id = p.author_id";

#[async_trait]
impl ContentRepository for PostgresRepository {
    async fn slug_exists(
        &self,
        kind: ContentKind,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> RepoResult<bool> {
        let sql = match kind {
            // Soft-deleted pages keep their slug reserved.
            ContentKind::Page => {
                "SELECT EXISTS (SELECT 1 FROM pages WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2))"
            }
            ContentKind::Post => {
                "SELECT EXISTS (SELECT 1 FROM blog_posts WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2))"
            }
        };
        let exists: bool = sqlx::query_scalar(sql)
            .bind(slug)
            .bind(exclude_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn list_pages(&self, filter: &ContentFilter) -> RepoResult<Paginated<Page>> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM pages p WHERE p.deleted_at IS NULL",
        );
        push_content_filters(&mut count, filter, false);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(PAGE_SELECT);
        select.push(" WHERE p.deleted_at IS NULL");
        push_content_filters(&mut select, filter, false);
        if filter.published_only {
            select.push(" ORDER BY p.published_at DESC, p.id DESC");
        } else {
            select.push(" ORDER BY p.sort_order ASC, p.created_at DESC, p.id DESC");
        }
        push_window(&mut select, filter.page);

        let pages = select.build_query_as::<Page>().fetch_all(&self.pool).await?;
        Ok(Paginated::new(pages, filter.page, total))
    }

    async fn get_page(&self, id: i64) -> RepoResult<Option<Page>> {
        let page = sqlx::query_as::<_, Page>(&format!(
            "{PAGE_SELECT} WHERE p.id = $1 AND p.deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(page)
    }

    async fn get_page_by_slug(&self, slug: &str) -> RepoResult<Option<Page>> {
        let page = sqlx::query_as::<_, Page>(&format!(
            "{PAGE_SELECT} WHERE p.slug = $1 AND p.deleted_at IS NULL"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(page)
    }

    async fn insert_page(&self, page: &Page) -> RepoResult<Page> {
        let created = sqlx::query_as::<_, Page>(
            r#"
            WITH p AS (
                INSERT INTO pages (
                    title, slug, content, excerpt, template, status, featured_image,
                    meta_title, meta_description, meta_keywords, parent_id, sort_order,
                    author_id, published_at, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $15)
                RETURNING *
            )
            SELECT p.*, u.name AS author_name FROM p LEFT JOIN users u ON u.id = p.author_id
            "#,
        )
        .bind(&page.title)
        .bind(&page.slug)
        .bind(&page.content)
        .bind(&page.excerpt)
        .bind(&page.template)
        .bind(page.status.as_str())
        .bind(&page.featured_image)
        .bind(&page.meta_title)
        .bind(&page.meta_description)
        .bind(&page.meta_keywords)
        .bind(page.parent_id)
        .bind(page.sort_order)
        .bind(page.author_id)
        .bind(page.published_at)
        .bind(page.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_page(&self, page: &Page) -> RepoResult<Option<Page>> {
        let updated = sqlx::query_as::<_, Page>(
            r#"
            WITH p AS (
                UPDATE pages SET
                    title = $2, slug = $3, content = $4, excerpt = $5, template = $6,
                    status = $7, featured_image = $8, meta_title = $9,
                    meta_description = $10, meta_keywords = $11, parent_id = $12,
                    sort_order = $13, published_at = $14, updated_at = $15
                WHERE id = $1 AND deleted_at IS NULL
                RETURNING *
            )
            SELECT p.*, u.name AS author_name FROM p LEFT JOIN users u ON u.id = p.author_id
            "#,
        )
        .bind(page.id)
        .bind(&page.title)
        .bind(&page.slug)
        .bind(&page.content)
        .bind(&page.excerpt)
        .bind(&page.template)
        .bind(page.status.as_str())
        .bind(&page.featured_image)
        .bind(&page.meta_title)
        .bind(&page.meta_description)
        .bind(&page.meta_keywords)
        .bind(page.parent_id)
        .bind(page.sort_order)
        .bind(page.published_at)
        .bind(page.updated_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn soft_delete_page(&self, id: i64, at: DateTime<Utc>) -> RepoResult<bool> {
        let result = sqlx::query(
            "UPDATE pages SET deleted_at = $2, updated_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(&self, filter: &ContentFilter) -> RepoResult<Paginated<BlogPost>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM blog_posts p WHERE TRUE");
        push_content_filters(&mut count, filter, true);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(POST_SELECT);
        select.push(" WHERE TRUE");
        push_content_filters(&mut select, filter, true);
        if filter.published_only {
            select.push(" ORDER BY p.published_at DESC, p.id DESC");
        } else {
            select.push(" ORDER BY p.created_at DESC, p.id DESC");
        }
        push_window(&mut select, filter.page);

        let posts = select.build_query_as::<BlogPost>().fetch_all(&self.pool).await?;
        Ok(Paginated::new(posts, filter.page, total))
    }

    async fn get_post(&self, id: i64) -> RepoResult<Option<BlogPost>> {
        let post = sqlx::query_as::<_, BlogPost>(&format!("{POST_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn get_post_by_slug(&self, slug: &str) -> RepoResult<Option<BlogPost>> {
        let post = sqlx::query_as::<_, BlogPost>(&format!("{POST_SELECT} WHERE p.slug = $1"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn insert_post(&self, post: &BlogPost) -> RepoResult<BlogPost> {
        let created = sqlx::query_as::<_, BlogPost>(
            r#"
            WITH p AS (
                INSERT INTO blog_posts (
                    title, slug, content, excerpt, featured_image, tags, status,
                    author_id, published_at, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
                RETURNING *
            )
            SELECT p.*, u.name AS author_name FROM p LEFT JOIN users u ON u.id = p.author_id
            "#,
        )
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(&post.featured_image)
        .bind(&post.tags)
        .bind(post.status.as_str())
        .bind(post.author_id)
        .bind(post.published_at)
        .bind(post.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_post(&self, post: &BlogPost) -> RepoResult<Option<BlogPost>> {
        let updated = sqlx::query_as::<_, BlogPost>(
            r#"
            WITH p AS (
                UPDATE blog_posts SET
                    title = $2, slug = $3, content = $4, excerpt = $5, featured_image = $6,
                    tags = $7, status = $8, published_at = $9, updated_at = $10
                WHERE id = $1
                RETURNING *
            )
            SELECT p.*, u.name AS author_name FROM p LEFT JOIN users u ON u.id = p.author_id
            "#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(&post.featured_image)
        .bind(&post.tags)
        .bind(post.status.as_str())
        .bind(post.published_at)
        .bind(post.updated_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_post(&self, id: i64) -> RepoResult<bool> {
        self.delete_row("blog_posts", id).await
    }

    async fn content_stats(&self, author_id: Option<i64>) -> RepoResult<DashboardStats> {
        let (total_posts, published_posts, draft_posts): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE status = 'published'),
                   COUNT(*) FILTER (WHERE status = 'draft')
            FROM blog_posts
            WHERE ($1::BIGINT IS NULL OR author_id = $1)
            "#,
        )
        .bind(author_id)
        .fetch_one(&self.pool)
        .await?;

        let (total_pages, published_pages, draft_pages): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE status = 'published'),
                   COUNT(*) FILTER (WHERE status = 'draft')
            FROM pages
            WHERE deleted_at IS NULL AND ($1::BIGINT IS NULL OR author_id = $1)
            "#,
        )
        .bind(author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardStats {
            total_posts,
            published_posts,
            draft_posts,
            total_pages,
            published_pages,
            draft_pages,
            media_files: 0,
        })
    }

    async fn recent_activity(
        &self,
        author_id: Option<i64>,
        limit: i64,
    ) -> RepoResult<Vec<ActivityItem>> {
        let items = sqlx::query_as::<_, ActivityItem>(
            r#"
            SELECT * FROM (
                SELECT id, 'post'::TEXT AS kind, title, status, updated_at
                FROM blog_posts
                WHERE ($1::BIGINT IS NULL OR author_id = $1)
                UNION ALL
                SELECT id, 'page'::TEXT AS kind, title, status, updated_at
                FROM pages
                WHERE deleted_at IS NULL AND ($1::BIGINT IS NULL OR author_id = $1)
            ) activity
            ORDER BY updated_at DESC
            LIMIT $2
            "#,
        )
        .bind(author_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}

/// Shared WHERE fragments for page and post listings; rows are aliased `p`.
fn push_content_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    filter: &ContentFilter,
    is_post: bool,
) {
    if let Some(author_id) = filter.author_id {
        builder.push(" AND p.author_id = ").push_bind(author_id);
    }
    if let Some(status) = filter.status {
        builder.push(" AND p.status = ").push_bind(status.as_str());
    }
    if filter.published_only {
        builder.push(" AND p.published_at IS NOT NULL");
    }
    if is_post {
        if let Some(tag) = &filter.tag {
            builder.push(" AND ").push_bind(tag.clone()).push(" = ANY(p.tags)");
        }
    } else if let Some(parent_id) = filter.parent_id {
        builder.push(" AND p.parent_id = ").push_bind(parent_id);
    }
    if let Some(term) = &filter.search {
        push_search(builder, &["p.title", "p.excerpt"], term);
    }
}
