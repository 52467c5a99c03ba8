use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;

use crate::{
    AppState,
    auth::{hash_password, issue_token, verify_password},
    error::ApiError,
    extract::JsonBody,
    models::{
        AuthResponse, LoginRequest, NewUser, RegisterRequest, Role, Validate,
        user::normalize_email,
    },
};

/// register
///
/// [Public Route] Creates a `user`-role account and signs it in. The role is fixed:
/// elevated roles are only granted through the admin user endpoints.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.validate()?;

    let password_hash = hash_password(payload.password, state.config.bcrypt_cost).await?;
    let user = state
        .repo
        .create_user(NewUser {
            name: payload.name.trim().to_string(),
            email: normalize_email(&payload.email),
            password_hash,
            role: Role::User,
            is_active: true,
        })
        .await?;

    let token = issue_token(&user, &state.config.jwt_secret)?;
    tracing::info!(user_id = user.id, "registered new account");
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// login
///
/// [Public Route] Exchanges credentials for a token. Unknown email and wrong
/// password are indistinguishable to the caller.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid credentials or disabled account")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.validate()?;
    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    let mut user = state
        .repo
        .find_user_by_email(&normalize_email(&payload.email))
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(payload.password, user.password_hash.clone()).await? {
        return Err(invalid());
    }
    if !user.is_active {
        return Err(ApiError::Unauthorized("Account is disabled".to_string()));
    }

    let now = Utc::now();
    state.repo.record_login(user.id, now).await?;
    user.last_login = Some(now);

    let token = issue_token(&user, &state.config.jwt_secret)?;
    Ok(Json(AuthResponse { token, user }))
}
