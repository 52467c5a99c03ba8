use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::ApiError,
    extract::JsonBody,
    handlers::MessageResponse,
    models::{Menu, MenuInput, MenuItem, MenuItemInput, Validate},
    repository::RepositoryState,
};

async fn require_menu(repo: &RepositoryState, id: i64) -> Result<Menu, ApiError> {
    repo.get_menu(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Menu"))
}

/// get_menu_by_location
///
/// [Public Route] The active menu for a site location, active items only, nested.
#[utoipa::path(
    get,
    path = "/api/menus/location/{location}",
    tag = "menus",
    params(("location" = String, Path, description = "Site location, e.g. header")),
    responses(
        (status = 200, description = "Menu with nested items", body = Menu),
        (status = 404, description = "No active menu at this location")
    )
)]
pub async fn get_menu_by_location(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> Result<Json<Menu>, ApiError> {
    let menu = state
        .repo
        .find_active_menu(&location)
        .await?
        .ok_or_else(|| ApiError::not_found("Menu"))?;
    Ok(Json(menu))
}

#[utoipa::path(
    get,
    path = "/api/menus",
    tag = "menus",
    responses((status = 200, description = "All menus with their items", body = Vec<Menu>))
)]
pub async fn list_menus(State(state): State<AppState>) -> Result<Json<Vec<Menu>>, ApiError> {
    Ok(Json(state.repo.list_menus().await?))
}

#[utoipa::path(
    get,
    path = "/api/menus/id/{id}",
    tag = "menus",
    params(("id" = i64, Path, description = "Menu id")),
    responses(
        (status = 200, description = "Menu", body = Menu),
        (status = 404, description = "Menu not found")
    )
)]
pub async fn get_menu(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Menu>, ApiError> {
    Ok(Json(require_menu(&state.repo, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/menus",
    tag = "menus",
    request_body = MenuInput,
    responses(
        (status = 201, description = "Menu created", body = Menu),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_menu(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<MenuInput>,
) -> Result<(StatusCode, Json<Menu>), ApiError> {
    payload.validate()?;
    let menu = state.repo.create_menu(&payload).await?;
    tracing::info!(menu_id = menu.id, location = %menu.location, "menu created");
    Ok((StatusCode::CREATED, Json(menu)))
}

#[utoipa::path(
    put,
    path = "/api/menus/id/{id}",
    tag = "menus",
    params(("id" = i64, Path, description = "Menu id")),
    request_body = MenuInput,
    responses(
        (status = 200, description = "Menu updated", body = Menu),
        (status = 404, description = "Menu not found")
    )
)]
pub async fn update_menu(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<MenuInput>,
) -> Result<Json<Menu>, ApiError> {
    payload.validate()?;
    let menu = state
        .repo
        .update_menu(id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Menu"))?;
    Ok(Json(menu))
}

/// delete_menu
///
/// [Content Route] Takes the menu's items with it.
#[utoipa::path(
    delete,
    path = "/api/menus/id/{id}",
    tag = "menus",
    params(("id" = i64, Path, description = "Menu id")),
    responses(
        (status = 200, description = "Menu deleted", body = MessageResponse),
        (status = 404, description = "Menu not found")
    )
)]
pub async fn delete_menu(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.repo.delete_menu(id).await? {
        return Err(ApiError::not_found("Menu"));
    }
    tracing::info!(menu_id = id, "menu deleted");
    Ok(Json(MessageResponse::new("Menu deleted successfully")))
}

/// list_menu_items
///
/// [Content Route] Flat list in sort order, including inactive items.
#[utoipa::path(
    get,
    path = "/api/menus/{menu_id}/items",
    tag = "menus",
    params(("menu_id" = i64, Path, description = "Menu id")),
    responses(
        (status = 200, description = "Items of the menu", body = Vec<MenuItem>),
        (status = 404, description = "Menu not found")
    )
)]
pub async fn list_menu_items(
    State(state): State<AppState>,
    Path(menu_id): Path<i64>,
) -> Result<Json<Vec<MenuItem>>, ApiError> {
    require_menu(&state.repo, menu_id).await?;
    Ok(Json(state.repo.list_menu_items(menu_id).await?))
}

/// create_menu_item
///
/// [Content Route] A parent, when given, must belong to the same menu.
#[utoipa::path(
    post,
    path = "/api/menus/{menu_id}/items",
    tag = "menus",
    params(("menu_id" = i64, Path, description = "Menu id")),
    request_body = MenuItemInput,
    responses(
        (status = 201, description = "Item created", body = MenuItem),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Menu or parent item not found")
    )
)]
pub async fn create_menu_item(
    State(state): State<AppState>,
    Path(menu_id): Path<i64>,
    JsonBody(payload): JsonBody<MenuItemInput>,
) -> Result<(StatusCode, Json<MenuItem>), ApiError> {
    payload.validate()?;
    require_menu(&state.repo, menu_id).await?;
    if let Some(parent_id) = payload.parent_id {
        let siblings = state.repo.list_menu_items(menu_id).await?;
        if !siblings.iter().any(|item| item.id == parent_id) {
            return Err(ApiError::not_found("Parent menu item"));
        }
    }
    let item = state.repo.create_menu_item(menu_id, &payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    put,
    path = "/api/menu-items/{id}",
    tag = "menus",
    params(("id" = i64, Path, description = "Menu item id")),
    request_body = MenuItemInput,
    responses(
        (status = 200, description = "Item updated", body = MenuItem),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Menu item not found")
    )
)]
pub async fn update_menu_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<MenuItemInput>,
) -> Result<Json<MenuItem>, ApiError> {
    payload.validate()?;
    if payload.parent_id == Some(id) {
        return Err(ApiError::Validation(
            "A menu item cannot be its own parent".to_string(),
        ));
    }
    let item = state
        .repo
        .update_menu_item(id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Menu item"))?;
    Ok(Json(item))
}

/// delete_menu_item
///
/// [Content Route] Nested items go with their parent.
#[utoipa::path(
    delete,
    path = "/api/menu-items/{id}",
    tag = "menus",
    params(("id" = i64, Path, description = "Menu item id")),
    responses(
        (status = 200, description = "Item deleted", body = MessageResponse),
        (status = 404, description = "Menu item not found")
    )
)]
pub async fn delete_menu_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.repo.delete_menu_item(id).await? {
        return Err(ApiError::not_found("Menu item"));
    }
    Ok(Json(MessageResponse::new("Menu item deleted successfully")))
}
