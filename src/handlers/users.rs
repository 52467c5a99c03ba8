use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    auth::{AuthUser, hash_password, verify_password},
    error::ApiError,
    extract::JsonBody,
    handlers::MessageResponse,
    models::{
        ChangePasswordRequest, CreateUserRequest, NewUser, Paginated, UpdateProfileRequest,
        UpdateUserAccessRequest, User, UserQuery, Validate, user::normalize_email,
    },
};

/// get_profile
///
/// [Authenticated Route] The caller's own account, as re-read by the auth layer.
#[utoipa::path(
    get,
    path = "/api/user/profile",
    tag = "users",
    responses((status = 200, description = "Current user", body = User))
)]
pub async fn get_profile(user: AuthUser) -> Json<User> {
    Json(user.user)
}

/// update_profile
///
/// [Authenticated Route] Edits name and contact details. Role, email and activation
/// are not editable here.
#[utoipa::path(
    put,
    path = "/api/user/profile",
    tag = "users",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn update_profile(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<UpdateProfileRequest>,
) -> Result<Json<User>, ApiError> {
    payload.validate()?;
    let updated = state
        .repo
        .update_profile(user.id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    Ok(Json(updated))
}

/// change_password
///
/// [Authenticated Route] Requires the current password; a wrong one is a 400 rather
/// than a 401 so the session itself stays valid.
#[utoipa::path(
    post,
    path = "/api/user/change-password",
    tag = "users",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Current password incorrect or new password too short")
    )
)]
pub async fn change_password(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.validate()?;

    if !verify_password(payload.current_password, user.user.password_hash.clone()).await? {
        return Err(ApiError::Validation(
            "Current password is incorrect".to_string(),
        ));
    }

    let password_hash = hash_password(payload.new_password, state.config.bcrypt_cost).await?;
    if !state.repo.set_password_hash(user.id, &password_hash).await? {
        return Err(ApiError::not_found("User"));
    }
    tracing::info!(user_id = user.id, "password changed");
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// list_users
///
/// [Admin Route] Paginated account listing with search, role and activation filters.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "users",
    params(UserQuery),
    responses((status = 200, description = "Users", body = Paginated<User>))
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Paginated<User>>, ApiError> {
    Ok(Json(state.repo.list_users(&query).await?))
}

/// create_user
///
/// [Admin Route] Creates an account with any role.
#[utoipa::path(
    post,
    path = "/api/admin/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    payload.validate()?;
    let password_hash = hash_password(payload.password, state.config.bcrypt_cost).await?;
    let user = state
        .repo
        .create_user(NewUser {
            name: payload.name.trim().to_string(),
            email: normalize_email(&payload.email),
            password_hash,
            role: payload.role,
            is_active: payload.is_active,
        })
        .await?;
    tracing::info!(user_id = user.id, role = %user.role, "admin created account");
    Ok((StatusCode::CREATED, Json(user)))
}

/// update_user_access
///
/// [Admin Route] Changes role and/or activation. A disabled user is rejected on
/// their next request, whatever tokens they still hold.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUserAccessRequest,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user_access(
    admin: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<UpdateUserAccessRequest>,
) -> Result<Json<User>, ApiError> {
    let locks_self_out =
        payload.is_active == Some(false) || payload.role.is_some_and(|role| !role.is_admin());
    if id == admin.id && locks_self_out {
        return Err(ApiError::Validation(
            "You cannot disable or demote your own account".to_string(),
        ));
    }
    let user = state
        .repo
        .update_user_access(id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    tracing::info!(
        user_id = user.id,
        role = %user.role,
        active = user.is_active,
        "account access changed"
    );
    Ok(Json(user))
}
