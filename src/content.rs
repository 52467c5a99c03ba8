//! Slug assignment and ownership rules shared by the page and post handlers.

use crate::{
    auth::AuthUser,
    error::ApiError,
    models::ContentKind,
    repository::RepositoryState,
};

/// Used when a title has no character that survives slugification.
pub const FALLBACK_SLUG: &str = "untitled";

/// slugify
///
/// Lowercases, turns whitespace and underscores into hyphens and drops everything
/// outside `[a-z0-9-]`. Runs of hyphens are kept as they are.
pub fn slugify(title: &str) -> String {
    let slug: String = title
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '_' { '-' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect();
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// unique_slug
///
/// Probes `base`, `base-1`, `base-2`, ... until the store reports no other record of
/// `kind` holding the candidate. `exclude_id` lets a record keep its own slug.
///
/// Check-then-act: two concurrent creations can pick the same candidate. The unique
/// index on the slug column turns the loser into a 409.
pub async fn unique_slug(
    repo: &RepositoryState,
    kind: ContentKind,
    base: &str,
    exclude_id: Option<i64>,
) -> Result<String, ApiError> {
    let mut candidate = base.to_string();
    let mut suffix = 0u32;
    while repo.slug_exists(kind, &candidate, exclude_id).await? {
        suffix += 1;
        candidate = format!("{base}-{suffix}");
    }
    Ok(candidate)
}

/// Slug for a new or edited record: the client's slug when given, else the title,
/// normalized and de-duplicated either way.
pub async fn resolve_slug(
    repo: &RepositoryState,
    kind: ContentKind,
    requested: Option<&str>,
    title: &str,
    exclude_id: Option<i64>,
) -> Result<String, ApiError> {
    let source = requested.filter(|slug| !slug.trim().is_empty()).unwrap_or(title);
    unique_slug(repo, kind, &slugify(source), exclude_id).await
}

/// Author filter for listings: admins see everything, everyone else their own rows.
pub fn listing_scope(user: &AuthUser) -> Option<i64> {
    (!user.role.is_admin()).then_some(user.id)
}

/// Non-admins may only touch records they authored.
pub fn ensure_owner(user: &AuthUser, author_id: i64) -> Result<(), ApiError> {
    if user.role.is_admin() || user.id == author_id {
        return Ok(());
    }
    Err(ApiError::Forbidden(
        "You can only manage your own content".to_string(),
    ))
}
