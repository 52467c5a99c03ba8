use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    config::AppConfig,
    error::ApiError,
    models::{Role, User},
    repository::RepositoryState,
};

/// `iss` claim stamped on and required of every token.
pub const TOKEN_ISSUER: &str = "gcx-cms";
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Claims
///
/// Token payload. The token is self-contained: nothing is stored server-side, and
/// the user is re-read on every request so disabling an account takes effect at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

impl Claims {
    pub fn new(user: &User, now: DateTime<Utc>) -> Self {
        Self {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
            iss: TOKEN_ISSUER.to_string(),
        }
    }
}

pub fn encode_claims(claims: &Claims, secret: &str) -> Result<String, ApiError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| ApiError::Internal(format!("token signing failed: {err}")))
}

/// issue_token
///
/// Mints a 24 hour HS256 token for `user`.
pub fn issue_token(user: &User, secret: &str) -> Result<String, ApiError> {
    encode_claims(&Claims::new(user, Utc::now()), secret)
}

/// verify_token
///
/// Checks signature, expiry and issuer. Every failure is a plain 401.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_issuer(&[TOKEN_ISSUER]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|err| {
        match err.kind() {
            ErrorKind::ExpiredSignature => tracing::debug!("rejected expired token"),
            other => tracing::debug!(reason = ?other, "rejected token"),
        }
        ApiError::Unauthorized("Invalid token".to_string())
    })
}

/// hash_password
///
/// bcrypt on the blocking pool; hashing at production cost takes long enough to stall
/// an executor thread.
pub async fn hash_password(password: String, cost: u32) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|err| ApiError::Internal(format!("hashing task failed: {err}")))?
        .map_err(|err| ApiError::Internal(format!("password hashing failed: {err}")))
}

/// Constant-time bcrypt comparison. A malformed stored hash counts as a mismatch.
pub async fn verify_password(password: String, hash: String) -> Result<bool, ApiError> {
    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|err| ApiError::Internal(format!("verification task failed: {err}")))?;
    match outcome {
        Ok(matches) => Ok(matches),
        Err(err) => {
            tracing::warn!(error = %err, "stored password hash could not be parsed");
            Ok(false)
        }
    }
}

/// AuthUser
///
/// The resolved identity of an authenticated request: the live user row plus the
/// id and role handlers check most often.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub role: Role,
    pub user: User,
}

/// authenticate
///
/// Bearer token → claims → fresh user lookup. A missing or disabled user fails even
/// when the token itself is still valid.
pub async fn authenticate(
    headers: &HeaderMap,
    repo: &RepositoryState,
    config: &AppConfig,
) -> Result<AuthUser, ApiError> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Authorization header required".to_string()))?;

    let token = header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Bearer token required".to_string()))?;

    let claims = verify_token(token, &config.jwt_secret)?;

    let user = repo
        .get_user(claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    if !user.is_active {
        return Err(ApiError::Unauthorized(
            "User account is disabled".to_string(),
        ));
    }

    Ok(AuthUser {
        id: user.id,
        role: user.role,
        user,
    })
}

/// AuthUser extractor
///
/// Reuses the identity `auth_middleware` already resolved for this request; on
/// routes without the middleware it authenticates from the headers itself.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);
        authenticate(&parts.headers, &repo, &config).await
    }
}

/// auth_middleware
///
/// Guards a route group: rejects with 401 before the handler runs, otherwise stores
/// the `AuthUser` in the request extensions for gates and handlers downstream.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(request.headers(), &state.repo, &state.config).await?;
    tracing::debug!(user_id = user.id, role = %user.role, "authenticated request");
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
