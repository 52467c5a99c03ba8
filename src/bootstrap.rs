use crate::{
    auth::hash_password,
    config::AppConfig,
    error::ApiError,
    models::{NewUser, Role, User, user::normalize_email},
    repository::RepositoryState,
};

/// ensure_default_admin
///
/// Creates the configured administrator when the store has none. Returns the new
/// account, or `None` when an admin already exists.
pub async fn ensure_default_admin(
    repo: &RepositoryState,
    config: &AppConfig,
) -> Result<Option<User>, ApiError> {
    if repo.count_admins().await? > 0 {
        tracing::debug!("admin account present, skipping bootstrap");
        return Ok(None);
    }

    let seed = &config.admin;
    let password_hash = hash_password(seed.password.clone(), config.bcrypt_cost).await?;
    let admin = repo
        .create_user(NewUser {
            name: seed.name.clone(),
            email: normalize_email(&seed.email),
            password_hash,
            role: Role::Admin,
            is_active: true,
        })
        .await?;

    tracing::info!(email = %admin.email, "created default admin account");
    Ok(Some(admin))
}
