use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{MemoryRepository, matches_search};
use crate::{
    models::{
        NewUser, PageRequest, Paginated, Role, UpdateProfileRequest, UpdateUserAccessRequest,
        User, UserQuery,
    },
    repository::{RepoError, RepoResult, UserRepository, constraints},
};

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn get_user(&self, id: i64) -> RepoResult<Option<User>> {
        Ok(self.read()?.users.get(id))
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let mut state = self.write()?;
        if state.users.iter().any(|existing| existing.email == user.email) {
            return Err(RepoError::conflict(constraints::USER_EMAIL));
        }
        let now = Utc::now();
        Ok(state.users.insert_with(|id| User {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            avatar: None,
            bio: None,
            company: None,
            phone: None,
            country: None,
            is_active: user.is_active,
            last_login: None,
            created_at: now,
            updated_at: now,
        }))
    }

    async fn update_profile(
        &self,
        id: i64,
        changes: &UpdateProfileRequest,
    ) -> RepoResult<Option<User>> {
        Ok(self.write()?.users.update(id, |user| {
            if let Some(name) = &changes.name {
                user.name = name.trim().to_string();
            }
            for (field, value) in [
                (&mut user.avatar, &changes.avatar),
                (&mut user.bio, &changes.bio),
                (&mut user.company, &changes.company),
                (&mut user.phone, &changes.phone),
                (&mut user.country, &changes.country),
            ] {
                if value.is_some() {
                    field.clone_from(value);
                }
            }
            user.updated_at = Utc::now();
        }))
    }

    async fn set_password_hash(&self, id: i64, password_hash: &str) -> RepoResult<bool> {
        let updated = self.write()?.users.update(id, |user| {
            user.password_hash = password_hash.to_string();
            user.updated_at = Utc::now();
        });
        Ok(updated.is_some())
    }

    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> RepoResult<()> {
        self.write()?.users.update(id, |user| user.last_login = Some(at));
        Ok(())
    }

    async fn list_users(&self, query: &UserQuery) -> RepoResult<Paginated<User>> {
        let state = self.read()?;
        let mut users: Vec<User> = state
            .users
            .iter()
            .filter(|user| query.role.is_none_or(|role| user.role == role))
            .filter(|user| query.is_active.is_none_or(|active| user.is_active == active))
            .filter(|user| {
                matches_search(
                    query.search.as_deref().filter(|t| !t.trim().is_empty()),
                    &[&user.name, &user.email],
                )
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(PageRequest::new(query.page, query.limit).slice(users))
    }

    async fn update_user_access(
        &self,
        id: i64,
        changes: &UpdateUserAccessRequest,
    ) -> RepoResult<Option<User>> {
        Ok(self.write()?.users.update(id, |user| {
            if let Some(role) = changes.role {
                user.role = role;
            }
            if let Some(is_active) = changes.is_active {
                user.is_active = is_active;
            }
            user.updated_at = Utc::now();
        }))
    }

    async fn count_admins(&self) -> RepoResult<i64> {
        let count = self
            .read()?
            .users
            .iter()
            .filter(|user| user.role == Role::Admin)
            .count();
        Ok(count as i64)
    }
}
