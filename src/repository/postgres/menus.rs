use async_trait::async_trait;

use super::PostgresRepository;
use crate::{
    models::{Menu, MenuInput, MenuItem, MenuItemInput, menu::nest_items},
    repository::{MenuRepository, RepoError, RepoResult},
};

impl PostgresRepository {
    async fn attach_items(&self, mut menu: Menu, active_only: bool) -> RepoResult<Menu> {
        let items = sqlx::query_as::<_, MenuItem>(
            r#"
            SELECT * FROM menu_items
            WHERE menu_id = $1 AND (NOT $2 OR is_active)
            ORDER BY sort_order, id
            "#,
        )
        .bind(menu.id)
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;
        menu.items = nest_items(items);
        Ok(menu)
    }
}

#[async_trait]
impl MenuRepository for PostgresRepository {
    async fn list_menus(&self) -> RepoResult<Vec<Menu>> {
        let menus = sqlx::query_as::<_, Menu>("SELECT * FROM menus ORDER BY location, name, id")
            .fetch_all(&self.pool)
            .await?;
        let mut assembled = Vec::with_capacity(menus.len());
        for menu in menus {
            assembled.push(self.attach_items(menu, false).await?);
        }
        Ok(assembled)
    }

    async fn get_menu(&self, id: i64) -> RepoResult<Option<Menu>> {
        match self.fetch_row::<Menu>("menus", id).await? {
            Some(menu) => Ok(Some(self.attach_items(menu, false).await?)),
            None => Ok(None),
        }
    }

    async fn find_active_menu(&self, location: &str) -> RepoResult<Option<Menu>> {
        let menu = sqlx::query_as::<_, Menu>(
            "SELECT * FROM menus WHERE location = $1 AND is_active ORDER BY id LIMIT 1",
        )
        .bind(location)
        .fetch_optional(&self.pool)
        .await?;
        match menu {
            Some(menu) => Ok(Some(self.attach_items(menu, true).await?)),
            None => Ok(None),
        }
    }

    async fn create_menu(&self, menu: &MenuInput) -> RepoResult<Menu> {
        let created = sqlx::query_as::<_, Menu>(
            "INSERT INTO menus (name, location, is_active) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(menu.name.trim())
        .bind(menu.location.trim())
        .bind(menu.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_menu(&self, id: i64, menu: &MenuInput) -> RepoResult<Option<Menu>> {
        let updated = sqlx::query_as::<_, Menu>(
            r#"
            UPDATE menus SET name = $2, location = $3, is_active = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(menu.name.trim())
        .bind(menu.location.trim())
        .bind(menu.is_active)
        .fetch_optional(&self.pool)
        .await?;
        match updated {
            Some(menu) => Ok(Some(self.attach_items(menu, false).await?)),
            None => Ok(None),
        }
    }

    async fn delete_menu(&self, id: i64) -> RepoResult<bool> {
        // menu_items cascade.
        self.delete_row("menus", id).await
    }

    async fn list_menu_items(&self, menu_id: i64) -> RepoResult<Vec<MenuItem>> {
        let items = sqlx::query_as::<_, MenuItem>(
            "SELECT * FROM menu_items WHERE menu_id = $1 ORDER BY sort_order, id",
        )
        .bind(menu_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn create_menu_item(&self, menu_id: i64, item: &MenuItemInput) -> RepoResult<MenuItem> {
        let created = sqlx::query_as::<_, MenuItem>(
            r#"
            INSERT INTO menu_items (menu_id, parent_id, label, url, target, icon_class, sort_order, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(menu_id)
        .bind(item.parent_id)
        .bind(item.label.trim())
        .bind(item.url.trim())
        .bind(&item.target)
        .bind(&item.icon_class)
        .bind(item.sort_order)
        .bind(item.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match RepoError::from(err) {
            // The only foreign keys are the menu and the parent item.
            RepoError::Constraint(_) => RepoError::NotFound,
            other => other,
        })?;
        Ok(created)
    }

    async fn update_menu_item(
        &self,
        id: i64,
        item: &MenuItemInput,
    ) -> RepoResult<Option<MenuItem>> {
        let updated = sqlx::query_as::<_, MenuItem>(
            r#"
            UPDATE menu_items SET
                parent_id = $2, label = $3, url = $4, target = $5, icon_class = $6,
                sort_order = $7, is_active = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(item.parent_id)
        .bind(item.label.trim())
        .bind(item.url.trim())
        .bind(&item.target)
        .bind(&item.icon_class)
        .bind(item.sort_order)
        .bind(item.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_menu_item(&self, id: i64) -> RepoResult<bool> {
        self.delete_row("menu_items", id).await
    }
}
