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
        ContentFilter, ContentKind, ContentQuery, CreatePageRequest, Page, Paginated,
        Publishable, UpdatePageRequest, Validate, content::DEFAULT_TEMPLATE,
    },
    repository::RepositoryState,
};

/// get_public_page
///
/// [Public Route] A page by slug, only while it is published.
#[utoipa::path(
    get,
    path = "/api/pages/{slug}",
    tag = "pages",
    params(("slug" = String, Path, description = "Page slug")),
    responses(
        (status = 200, description = "Published page", body = Page),
        (status = 404, description = "No published page with this slug")
    )
)]
pub async fn get_public_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Page>, ApiError> {
    let page = state
        .repo
        .get_page_by_slug(&slug)
        .await?
        .filter(|page| page.is_published(Utc::now()))
        .ok_or_else(|| ApiError::not_found("Page"))?;
    Ok(Json(page))
}

/// list_pages
///
/// [Content Route] Non-admins only see pages they authored.
#[utoipa::path(
    get,
    path = "/api/pages",
    tag = "pages",
    params(ContentQuery),
    responses((status = 200, description = "Pages", body = Paginated<Page>))
)]
pub async fn list_pages(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> Result<Json<Paginated<Page>>, ApiError> {
    let filter = ContentFilter::from_query(query, listing_scope(&user));
    Ok(Json(state.repo.list_pages(&filter).await?))
}

/// create_page
///
/// [Content Route] The caller becomes the author. Slugs derive from the title unless
/// one is supplied, and collide into `-1`, `-2`, ... suffixes.
#[utoipa::path(
    post,
    path = "/api/pages",
    tag = "pages",
    request_body = CreatePageRequest,
    responses(
        (status = 201, description = "Page created", body = Page),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_page(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreatePageRequest>,
) -> Result<(StatusCode, Json<Page>), ApiError> {
    payload.validate()?;
    let now = Utc::now();
    let slug = resolve_slug(
        &state.repo,
        ContentKind::Page,
        payload.slug.as_deref(),
        &payload.title,
        None,
    )
    .await?;

    let mut page = Page {
        id: 0,
        title: payload.title.trim().to_string(),
        slug,
        content: payload.content,
        excerpt: payload.excerpt,
        template: payload
            .template
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string()),
        status: Default::default(),
        featured_image: payload.featured_image,
        meta_title: payload.meta_title,
        meta_description: payload.meta_description,
        meta_keywords: payload.meta_keywords,
        parent_id: payload.parent_id,
        sort_order: payload.sort_order.unwrap_or(0),
        author_id: user.id,
        author_name: None,
        published_at: None,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };
    page.apply_status(payload.status.unwrap_or_default(), now);

    let created = state.repo.insert_page(&page).await?;
    tracing::info!(page_id = created.id, slug = %created.slug, "page created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn owned_page(repo: &RepositoryState, user: &AuthUser, id: i64) -> Result<Page, ApiError> {
    let page = repo
        .get_page(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Page"))?;
    ensure_owner(user, page.author_id)?;
    Ok(page)
}

/// get_page
///
/// [Content Route] Any status; owner or admin only.
#[utoipa::path(
    get,
    path = "/api/pages/id/{id}",
    tag = "pages",
    params(("id" = i64, Path, description = "Page id")),
    responses(
        (status = 200, description = "Page", body = Page),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Page not found")
    )
)]
pub async fn get_page(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Page>, ApiError> {
    Ok(Json(owned_page(&state.repo, &user, id).await?))
}

/// update_page
///
/// [Content Route] Partial edit. A status change runs through the publish state
/// machine; the slug only changes when a different one is requested.
#[utoipa::path(
    put,
    path = "/api/pages/id/{id}",
    tag = "pages",
    params(("id" = i64, Path, description = "Page id")),
    request_body = UpdatePageRequest,
    responses(
        (status = 200, description = "Page updated", body = Page),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Page not found")
    )
)]
pub async fn update_page(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<UpdatePageRequest>,
) -> Result<Json<Page>, ApiError> {
    payload.validate()?;
    let mut page = owned_page(&state.repo, &user, id).await?;
    let now = Utc::now();

    if let Some(requested) = payload.slug.as_deref().filter(|s| *s != page.slug) {
        page.slug = resolve_slug(
            &state.repo,
            ContentKind::Page,
            Some(requested),
            &page.title,
            Some(page.id),
        )
        .await?;
    }
    if let Some(title) = payload.title {
        page.title = title.trim().to_string();
    }
    if let Some(content) = payload.content {
        page.content = content;
    }
    if let Some(excerpt) = payload.excerpt {
        page.excerpt = excerpt;
    }
    if let Some(template) = payload.template.filter(|t| !t.trim().is_empty()) {
        page.template = template;
    }
    if payload.featured_image.is_some() {
        page.featured_image = payload.featured_image;
    }
    if payload.meta_title.is_some() {
        page.meta_title = payload.meta_title;
    }
    if payload.meta_description.is_some() {
        page.meta_description = payload.meta_description;
    }
    if payload.meta_keywords.is_some() {
        page.meta_keywords = payload.meta_keywords;
    }
    if let Some(parent_id) = payload.parent_id {
        if parent_id == page.id {
            return Err(ApiError::Validation(
                "A page cannot be its own parent".to_string(),
            ));
        }
        page.parent_id = Some(parent_id);
    }
    if let Some(sort_order) = payload.sort_order {
        page.sort_order = sort_order;
    }
    if let Some(status) = payload.status {
        page.apply_status(status, now);
    }
    page.updated_at = now;

    let updated = state
        .repo
        .update_page(&page)
        .await?
        .ok_or_else(|| ApiError::not_found("Page"))?;
    Ok(Json(updated))
}

/// delete_page
///
/// [Content Route] Soft delete: the page disappears from every read, its slug stays
/// taken.
#[utoipa::path(
    delete,
    path = "/api/pages/id/{id}",
    tag = "pages",
    params(("id" = i64, Path, description = "Page id")),
    responses(
        (status = 200, description = "Page deleted", body = MessageResponse),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Page not found")
    )
)]
pub async fn delete_page(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    owned_page(&state.repo, &user, id).await?;
    if !state.repo.soft_delete_page(id, Utc::now()).await? {
        return Err(ApiError::not_found("Page"));
    }
    tracing::info!(page_id = id, "page deleted");
    Ok(Json(MessageResponse::new("Page deleted successfully")))
}
