use axum::{Json, extract::State};

use crate::{
    AppState,
    auth::AuthUser,
    content::listing_scope,
    error::ApiError,
    models::{ActivityItem, DashboardStats},
};

pub const ACTIVITY_LIMIT: i64 = 10;

/// get_stats
///
/// [Content Route] Post and page counts by status plus the media count. Bloggers see
/// counts for their own content only; the media count is global.
#[utoipa::path(
    get,
    path = "/api/cms/dashboard/stats",
    tag = "dashboard",
    responses((status = 200, description = "Dashboard counters", body = DashboardStats))
)]
pub async fn get_stats(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, ApiError> {
    let mut stats = state.repo.content_stats(listing_scope(&user)).await?;
    stats.media_files = match state.storage.list().await {
        Ok(files) => files.len() as i64,
        Err(err) => {
            tracing::warn!(error = %err, "media count unavailable");
            0
        }
    };
    Ok(Json(stats))
}

/// get_activity
///
/// [Content Route] The most recently updated posts and pages.
#[utoipa::path(
    get,
    path = "/api/cms/dashboard/activity",
    tag = "dashboard",
    responses((status = 200, description = "Recent activity", body = Vec<ActivityItem>))
)]
pub async fn get_activity(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ActivityItem>>, ApiError> {
    Ok(Json(
        state
            .repo
            .recent_activity(listing_scope(&user), ACTIVITY_LIMIT)
            .await?,
    ))
}
