use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};

use super::{PostgresRepository, push_search, push_window};
use crate::{
    models::{
        NewUser, PageRequest, Paginated, Role, UpdateProfileRequest, UpdateUserAccessRequest,
        User, UserQuery,
    },
    repository::{RepoResult, UserRepository},
};

#[async_trait]
impl UserRepository for PostgresRepository {
    async fn get_user(&self, id: i64) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_profile(
        &self,
        id: i64,
        changes: &UpdateProfileRequest,
    ) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name       = COALESCE($2, name),
                avatar     = COALESCE($3, avatar),
                bio        = COALESCE($4, bio),
                company    = COALESCE($5, company),
                phone      = COALESCE($6, phone),
                country    = COALESCE($7, country),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref().map(str::trim))
        .bind(&changes.avatar)
        .bind(&changes.bio)
        .bind(&changes.company)
        .bind(&changes.phone)
        .bind(&changes.country)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn set_password_hash(&self, id: i64, password_hash: &str) -> RepoResult<bool> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> RepoResult<()> {
        sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_users(&self, query: &UserQuery) -> RepoResult<Paginated<User>> {
        let page = PageRequest::new(query.page, query.limit);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users WHERE TRUE");
        push_user_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM users WHERE TRUE");
        push_user_filters(&mut select, query);
        select.push(" ORDER BY created_at DESC, id DESC");
        push_window(&mut select, page);
        let users = select.build_query_as::<User>().fetch_all(&self.pool).await?;

        Ok(Paginated::new(users, page, total))
    }

    async fn update_user_access(
        &self,
        id: i64,
        changes: &UpdateUserAccessRequest,
    ) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                role       = COALESCE($2, role),
                is_active  = COALESCE($3, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.role.map(Role::as_str))
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn count_admins(&self) -> RepoResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(Role::Admin.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn push_user_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &UserQuery) {
    if let Some(role) = query.role {
        builder.push(" AND role = ").push_bind(role.as_str());
    }
    if let Some(is_active) = query.is_active {
        builder.push(" AND is_active = ").push_bind(is_active);
    }
    if let Some(term) = query.search.as_deref().filter(|t| !t.trim().is_empty()) {
        push_search(builder, &["name", "email"], term);
    }
}
