use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::{
    AppState,
    auth::AuthUser,
    content::{ensure_owner, listing_scope, resolve_slug},
    error::ApiError,
    extract::JsonBody,
    handlers::MessageResponse,
    models::{
        BlogPost, ContentFilter, ContentKind, ContentQuery, CreatePostRequest, Paginated,
        Publishable, UpdatePostRequest, Validate,
    },
    repository::RepositoryState,
};

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !cleaned.iter().any(|t| t == tag) {
            cleaned.push(tag.to_string());
        }
    }
    cleaned
}

/// list_public_posts
///
/// [Public Route] Published posts, newest publication first.
#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(ContentQuery),
    responses((status = 200, description = "Published posts", body = Paginated<BlogPost>))
)]
pub async fn list_public_posts(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> Result<Json<Paginated<BlogPost>>, ApiError> {
    Ok(Json(
        state.repo.list_posts(&ContentFilter::published(query)).await?,
    ))
}

/// get_public_post
///
/// [Public Route] A published post by slug.
#[utoipa::path(
    get,
    path = "/api/posts/{slug}",
    tag = "posts",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Published post", body = BlogPost),
        (status = 404, description = "No published post with this slug")
    )
)]
pub async fn get_public_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogPost>, ApiError> {
    let post = state
        .repo
        .get_post_by_slug(&slug)
        .await?
        .filter(|post| post.is_published(Utc::now()))
        .ok_or_else(|| ApiError::not_found("Post"))?;
    Ok(Json(post))
}

/// list_posts
///
/// [Content Route] All statuses; non-admins only see their own posts.
#[utoipa::path(
    get,
    path = "/api/cms/posts",
    tag = "posts",
    params(ContentQuery),
    responses((status = 200, description = "Posts", body = Paginated<BlogPost>))
)]
pub async fn list_posts(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> Result<Json<Paginated<BlogPost>>, ApiError> {
    let filter = ContentFilter::from_query(query, listing_scope(&user));
    Ok(Json(state.repo.list_posts(&filter).await?))
}

/// create_post
///
/// [Content Route] Same slug rules as pages, in a separate namespace.
#[utoipa::path(
    post,
    path = "/api/cms/posts",
    tag = "posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = BlogPost),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_post(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreatePostRequest>,
) -> Result<(StatusCode, Json<BlogPost>), ApiError> {
    payload.validate()?;
    let now = Utc::now();
    let slug = resolve_slug(
        &state.repo,
        ContentKind::Post,
        payload.slug.as_deref(),
        &payload.title,
        None,
    )
    .await?;

    let mut post = BlogPost {
        id: 0,
        title: payload.title.trim().to_string(),
        slug,
        content: payload.content,
        excerpt: payload.excerpt,
        featured_image: payload.featured_image,
        tags: clean_tags(payload.tags),
        status: Default::default(),
        author_id: user.id,
        author_name: None,
        published_at: None,
        created_at: now,
        updated_at: now,
    };
    post.apply_status(payload.status.unwrap_or_default(), now);

    let created = state.repo.insert_post(&post).await?;
    tracing::info!(post_id = created.id, slug = %created.slug, "post created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn owned_post(
    repo: &RepositoryState,
    user: &AuthUser,
    id: i64,
) -> Result<BlogPost, ApiError> {
    let post = repo
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post"))?;
    ensure_owner(user, post.author_id)?;
    Ok(post)
}

#[utoipa::path(
    get,
    path = "/api/cms/posts/{id}",
    tag = "posts",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post", body = BlogPost),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn get_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<BlogPost>, ApiError> {
    Ok(Json(owned_post(&state.repo, &user, id).await?))
}

/// update_post
///
/// [Content Route] Partial edit; see `update_page` for the slug and status rules.
#[utoipa::path(
    put,
    path = "/api/cms/posts/{id}",
    tag = "posts",
    params(("id" = i64, Path, description = "Post id")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = BlogPost),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn update_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<UpdatePostRequest>,
) -> Result<Json<BlogPost>, ApiError> {
    payload.validate()?;
    let mut post = owned_post(&state.repo, &user, id).await?;
    let now = Utc::now();

    if let Some(requested) = payload.slug.as_deref().filter(|s| *s != post.slug) {
        post.slug = resolve_slug(
            &state.repo,
            ContentKind::Post,
            Some(requested),
            &post.title,
            Some(post.id),
        )
        .await?;
    }
    if let Some(title) = payload.title {
        post.title = title.trim().to_string();
    }
    if let Some(content) = payload.content {
        post.content = content;
    }
    if let Some(excerpt) = payload.excerpt {
        post.excerpt = excerpt;
    }
    if payload.featured_image.is_some() {
        post.featured_image = payload.featured_image;
    }
    if let Some(tags) = payload.tags {
        post.tags = clean_tags(tags);
    }
    if let Some(status) = payload.status {
        post.apply_status(status, now);
    }
    post.updated_at = now;

    let updated = state
        .repo
        .update_post(&post)
        .await?
        .ok_or_else(|| ApiError::not_found("Post"))?;
    Ok(Json(updated))
}

/// delete_post
///
/// [Content Route] Posts are removed outright.
#[utoipa::path(
    delete,
    path = "/api/cms/posts/{id}",
    tag = "posts",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post deleted", body = MessageResponse),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn delete_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    owned_post(&state.repo, &user, id).await?;
    if !state.repo.delete_post(id).await? {
        return Err(ApiError::not_found("Post"));
    }
    tracing::info!(post_id = id, "post deleted");
    Ok(Json(MessageResponse::new("Post deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::clean_tags;

    #[test]
    fn tags_are_trimmed_and_deduplicated() {
        let tags = vec![
            " cocoa ".to_string(),
            "".to_string(),
            "cocoa".to_string(),
            "maize".to_string(),
        ];
        assert_eq!(clean_tags(tags), vec!["cocoa", "maize"]);
    }
}
