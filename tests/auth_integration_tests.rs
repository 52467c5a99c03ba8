mod common;

use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use chrono::{Duration, Utc};
use common::{PASSWORD, seed_user, test_state};
use gcx_cms::{
    ApiError,
    auth::{
        Claims, TOKEN_ISSUER, TOKEN_TTL_HOURS, authenticate, encode_claims, hash_password,
        issue_token, verify_password, verify_token,
    },
    models::{Role, UpdateUserAccessRequest},
    policy::{Capability, ensure},
};

fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).expect("header"),
    );
    headers
}

fn assert_unauthorized(result: Result<impl std::fmt::Debug, ApiError>, message: &str) {
    match result {
        Err(err) => {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
            assert_eq!(err.to_string(), message);
        }
        Ok(value) => panic!("expected 401 '{message}', got {value:?}"),
    }
}

// --- Tokens ---

#[tokio::test]
async fn test_issued_token_round_trips_claims() {
    let state = test_state();
    let user = seed_user(&state, Role::Blogger, "blogger@gcx.test").await;

    let token = issue_token(&user.user, &state.config.jwt_secret).unwrap();
    let claims = verify_token(&token, &state.config.jwt_secret).unwrap();

    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.email, "blogger@gcx.test");
    assert_eq!(claims.role, Role::Blogger);
    assert_eq!(claims.iss, TOKEN_ISSUER);
    assert_eq!(claims.exp - claims.iat, TOKEN_TTL_HOURS * 3600);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let state = test_state();
    let user = seed_user(&state, Role::User, "late@gcx.test").await;

    let issued = Utc::now() - Duration::hours(TOKEN_TTL_HOURS + 1);
    let token = encode_claims(&Claims::new(&user.user, issued), &state.config.jwt_secret).unwrap();

    assert_unauthorized(verify_token(&token, &state.config.jwt_secret), "Invalid token");
}

#[tokio::test]
async fn test_wrong_secret_and_issuer_are_rejected() {
    let state = test_state();
    let user = seed_user(&state, Role::User, "forged@gcx.test").await;

    let token = issue_token(&user.user, "some-other-secret").unwrap();
    assert_unauthorized(verify_token(&token, &state.config.jwt_secret), "Invalid token");

    let mut claims = Claims::new(&user.user, Utc::now());
    claims.iss = "someone-else".to_string();
    let token = encode_claims(&claims, &state.config.jwt_secret).unwrap();
    assert_unauthorized(verify_token(&token, &state.config.jwt_secret), "Invalid token");

    assert_unauthorized(
        verify_token("not.a.token", &state.config.jwt_secret),
        "Invalid token",
    );
}

// --- Passwords ---

#[tokio::test]
async fn test_password_hash_verifies() {
    let hash = hash_password("hunter22".to_string(), 4).await.unwrap();
    assert_ne!(hash, "hunter22");
    assert!(verify_password("hunter22".to_string(), hash.clone()).await.unwrap());
    assert!(!verify_password("hunter23".to_string(), hash).await.unwrap());
}

#[tokio::test]
async fn test_malformed_hash_counts_as_mismatch() {
    let outcome = verify_password(PASSWORD.to_string(), "not-a-bcrypt-hash".to_string()).await;
    assert!(!outcome.unwrap());
}

// --- Request authentication ---

#[tokio::test]
async fn test_authenticate_resolves_live_user() {
    let state = test_state();
    let user = seed_user(&state, Role::Trader, "trader@gcx.test").await;
    let token = issue_token(&user.user, &state.config.jwt_secret).unwrap();

    let resolved = authenticate(&bearer(&token), &state.repo, &state.config)
        .await
        .unwrap();

    assert_eq!(resolved.id, user.id);
    assert_eq!(resolved.role, Role::Trader);
}

#[tokio::test]
async fn test_authenticate_header_errors() {
    let state = test_state();

    assert_unauthorized(
        authenticate(&HeaderMap::new(), &state.repo, &state.config).await,
        "Authorization header required",
    );

    let mut basic = HeaderMap::new();
    basic.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
    assert_unauthorized(
        authenticate(&basic, &state.repo, &state.config).await,
        "Bearer token required",
    );
}

#[tokio::test]
async fn test_disabled_user_is_rejected_with_valid_token() {
    let state = test_state();
    let user = seed_user(&state, Role::Blogger, "disabled@gcx.test").await;
    let token = issue_token(&user.user, &state.config.jwt_secret).unwrap();

    state
        .repo
        .update_user_access(
            user.id,
            &UpdateUserAccessRequest {
                role: None,
                is_active: Some(false),
            },
        )
        .await
        .unwrap();

    assert_unauthorized(
        authenticate(&bearer(&token), &state.repo, &state.config).await,
        "User account is disabled",
    );
}

#[tokio::test]
async fn test_token_for_unknown_user_is_rejected() {
    let state = test_state();
    let user = seed_user(&state, Role::User, "ghost@gcx.test").await;
    let mut claims = Claims::new(&user.user, Utc::now());
    claims.sub = user.id + 1000;
    let token = encode_claims(&claims, &state.config.jwt_secret).unwrap();

    assert_unauthorized(
        authenticate(&bearer(&token), &state.repo, &state.config).await,
        "User not found",
    );
}

// --- Capability policy ---

#[test]
fn test_capability_matrix() {
    use Capability::*;

    let expectations = [
        (Role::Admin, [true, true, true, true, true]),
        (Role::Blogger, [true, false, false, false, false]),
        (Role::Trader, [false, false, true, true, true]),
        (Role::Premium, [false, false, true, true, true]),
        (Role::User, [false, false, true, false, false]),
    ];
    let capabilities = [
        ManageContent,
        ManageUsers,
        AccessMarketData,
        AccessRealTimeData,
        AccessHistoricalData,
    ];

    for (role, allowed) in expectations {
        for (capability, expected) in capabilities.iter().zip(allowed) {
            assert_eq!(
                role.can(*capability),
                expected,
                "{role} / {}",
                capability.as_str()
            );
        }
        assert_eq!(role.can(ManageSettings), role == Role::Admin);
    }
}

#[tokio::test]
async fn test_ensure_returns_forbidden() {
    let state = test_state();
    let user = seed_user(&state, Role::User, "plain@gcx.test").await;

    let err = ensure(&user, Capability::ManageContent).unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(err.to_string(), "Insufficient permissions");
    assert!(ensure(&user, Capability::AccessMarketData).is_ok());
}
