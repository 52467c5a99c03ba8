use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    AppState,
    error::ApiError,
    extract::JsonBody,
    handlers::MessageResponse,
    models::{
        BatchUpdateRequest, CreateSettingRequest, Setting, SettingQuery, UpdateSettingRequest,
        Validate,
        setting::{BatchUpdateResponse, is_known_type},
    },
    repository::RepositoryState,
};

/// PublicSettings
///
/// `{"settings": {"key": "value", ...}}` as consumed by the public site.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PublicSettings {
    pub settings: BTreeMap<String, String>,
}

/// Public settings as a key/value map, optionally narrowed to one group.
pub async fn public_settings_map(
    repo: &RepositoryState,
    group: Option<&str>,
) -> Result<PublicSettings, ApiError> {
    let query = SettingQuery {
        group: group.map(str::to_string),
        is_public: Some(true),
    };
    let settings = repo
        .list_settings(&query)
        .await?
        .into_iter()
        .map(|setting| (setting.key, setting.value))
        .collect();
    Ok(PublicSettings { settings })
}

fn check_type(setting_type: &str) -> Result<(), ApiError> {
    if is_known_type(setting_type) {
        return Ok(());
    }
    Err(ApiError::Validation(format!(
        "Invalid setting type '{setting_type}'"
    )))
}

/// get_public_settings
///
/// [Public Route] Every public setting as one flat map.
#[utoipa::path(
    get,
    path = "/api/settings/public",
    tag = "settings",
    responses((status = 200, description = "Public settings", body = PublicSettings))
)]
pub async fn get_public_settings(
    State(state): State<AppState>,
) -> Result<Json<PublicSettings>, ApiError> {
    Ok(Json(public_settings_map(&state.repo, None).await?))
}

/// get_public_group
///
/// [Public Route] Public settings of one group. The site's section shortcuts
/// (`/api/settings/hero` and friends) resolve here too.
#[utoipa::path(
    get,
    path = "/api/settings/public/{group}",
    tag = "settings",
    params(("group" = String, Path, description = "Setting group")),
    responses((status = 200, description = "Public settings of the group", body = PublicSettings))
)]
pub async fn get_public_group(
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Result<Json<PublicSettings>, ApiError> {
    Ok(Json(public_settings_map(&state.repo, Some(&group)).await?))
}

/// list_settings
///
/// [Authenticated Route] Ordered by group, sort order, then key.
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "settings",
    params(SettingQuery),
    responses((status = 200, description = "Settings", body = Vec<Setting>))
)]
pub async fn list_settings(
    State(state): State<AppState>,
    Query(query): Query<SettingQuery>,
) -> Result<Json<Vec<Setting>>, ApiError> {
    Ok(Json(state.repo.list_settings(&query).await?))
}

#[utoipa::path(
    get,
    path = "/api/settings/group/{group}",
    tag = "settings",
    params(("group" = String, Path, description = "Setting group")),
    responses((status = 200, description = "Settings of the group", body = Vec<Setting>))
)]
pub async fn list_group_settings(
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Result<Json<Vec<Setting>>, ApiError> {
    let query = SettingQuery {
        group: Some(group),
        is_public: None,
    };
    Ok(Json(state.repo.list_settings(&query).await?))
}

#[utoipa::path(
    get,
    path = "/api/settings/{key}",
    tag = "settings",
    params(("key" = String, Path, description = "Setting key")),
    responses(
        (status = 200, description = "Setting", body = Setting),
        (status = 404, description = "Setting not found")
    )
)]
pub async fn get_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Setting>, ApiError> {
    let setting = state
        .repo
        .get_setting(&key)
        .await?
        .ok_or_else(|| ApiError::not_found("Setting"))?;
    Ok(Json(setting))
}

/// create_setting
///
/// [Admin Route] Keys are unique; a duplicate is a 409.
#[utoipa::path(
    post,
    path = "/api/settings",
    tag = "settings",
    request_body = CreateSettingRequest,
    responses(
        (status = 201, description = "Setting created", body = Setting),
        (status = 400, description = "Missing key or unknown type"),
        (status = 409, description = "Key already exists")
    )
)]
pub async fn create_setting(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateSettingRequest>,
) -> Result<(StatusCode, Json<Setting>), ApiError> {
    payload.validate()?;
    check_type(&payload.setting_type)?;
    let setting = state.repo.create_setting(&payload).await?;
    tracing::info!(key = %setting.key, group = %setting.group, "setting created");
    Ok((StatusCode::CREATED, Json(setting)))
}

/// update_setting
///
/// [Admin Route] Everything but the key is editable.
#[utoipa::path(
    put,
    path = "/api/settings/{key}",
    tag = "settings",
    params(("key" = String, Path, description = "Setting key")),
    request_body = UpdateSettingRequest,
    responses(
        (status = 200, description = "Setting updated", body = Setting),
        (status = 404, description = "Setting not found")
    )
)]
pub async fn update_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    JsonBody(payload): JsonBody<UpdateSettingRequest>,
) -> Result<Json<Setting>, ApiError> {
    if let Some(setting_type) = &payload.setting_type {
        check_type(setting_type)?;
    }
    let setting = state
        .repo
        .update_setting(&key, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Setting"))?;
    Ok(Json(setting))
}

/// update_settings_batch
///
/// [Admin Route] All items land in one transaction. Keys that do not exist are
/// skipped without error; an item with an unknown type aborts the batch and
/// nothing is written. Each item may also move the setting to another group or
/// change its label, description, visibility and sort order.
#[utoipa::path(
    put,
    path = "/api/settings/batch",
    tag = "settings",
    request_body = BatchUpdateRequest,
    responses(
        (status = 200, description = "Batch applied", body = BatchUpdateResponse),
        (status = 400, description = "Batch rejected, nothing written")
    )
)]
pub async fn update_settings_batch(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<BatchUpdateRequest>,
) -> Result<Json<BatchUpdateResponse>, ApiError> {
    let items = payload.items();
    let updated = state.repo.update_settings_batch(items).await?;
    tracing::info!(
        requested = items.len(),
        updated,
        "settings batch applied"
    );
    Ok(Json(BatchUpdateResponse {
        message: "Settings updated successfully".to_string(),
        updated,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/settings/{key}",
    tag = "settings",
    params(("key" = String, Path, description = "Setting key")),
    responses(
        (status = 200, description = "Setting deleted", body = MessageResponse),
        (status = 404, description = "Setting not found")
    )
)]
pub async fn delete_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.repo.delete_setting(&key).await? {
        return Err(ApiError::not_found("Setting"));
    }
    tracing::info!(key = %key, "setting deleted");
    Ok(Json(MessageResponse::new("Setting deleted successfully")))
}
