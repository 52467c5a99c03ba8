#![allow(dead_code)]

use std::sync::Arc;

use gcx_cms::{
    AppConfig, AppState, MemoryRepository, MockStorageService, create_router,
    auth::{AuthUser, hash_password, issue_token},
    models::{NewUser, Role},
    repository::RepositoryState,
    storage::StorageState,
};
use tokio::net::TcpListener;

pub const PASSWORD: &str = "secret123";

/// In-memory state with the cheap bcrypt cost from `AppConfig::default()`.
pub fn test_state() -> AppState {
    state_with_storage(Arc::new(MockStorageService::new()))
}

pub fn state_with_storage(storage: StorageState) -> AppState {
    AppState {
        repo: Arc::new(MemoryRepository::new()) as RepositoryState,
        storage,
        config: AppConfig::default(),
    }
}

/// Inserts an active account with `PASSWORD` and returns it as a resolved identity.
pub async fn seed_user(state: &AppState, role: Role, email: &str) -> AuthUser {
    let password_hash = hash_password(PASSWORD.to_string(), state.config.bcrypt_cost)
        .await
        .expect("hash");
    let user = state
        .repo
        .create_user(NewUser {
            name: format!("{role} account"),
            email: email.to_string(),
            password_hash,
            role,
            is_active: true,
        })
        .await
        .expect("seed user");
    AuthUser {
        id: user.id,
        role: user.role,
        user,
    }
}

/// Seeds a user and returns a bearer token for it.
pub async fn token_for(state: &AppState, role: Role, email: &str) -> String {
    let user = seed_user(state, role, email).await;
    issue_token(&user.user, &state.config.jwt_secret).expect("token")
}

pub struct TestApp {
    pub address: String,
    pub state: AppState,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

/// Serves the full router on an ephemeral port.
pub async fn spawn_app_with(state: AppState) -> TestApp {
    let router = create_router(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().expect("local addr").port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server");
    });

    TestApp {
        address: format!("http://127.0.0.1:{port}"),
        state,
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_state()).await
}
