use async_trait::async_trait;
use chrono::Utc;

use super::{MemoryRepository, MemoryState};
use crate::{
    models::{Menu, MenuInput, MenuItem, MenuItemInput, menu::nest_items},
    repository::{MenuRepository, RepoError, RepoResult},
};

impl MemoryState {
    fn assembled_menu(&self, mut menu: Menu, active_only: bool) -> Menu {
        let items = self
            .menu_items
            .iter()
            .filter(|item| item.menu_id == menu.id && (!active_only || item.is_active))
            .cloned()
            .collect();
        menu.items = nest_items(items);
        menu
    }
}

#[async_trait]
impl MenuRepository for MemoryRepository {
    async fn list_menus(&self) -> RepoResult<Vec<Menu>> {
        let state = self.read()?;
        let mut menus: Vec<Menu> = state
            .menus
            .iter()
            .map(|menu| state.assembled_menu(menu.clone(), false))
            .collect();
        menus.sort_by(|a, b| (&a.location, &a.name, a.id).cmp(&(&b.location, &b.name, b.id)));
        Ok(menus)
    }

    async fn get_menu(&self, id: i64) -> RepoResult<Option<Menu>> {
        let state = self.read()?;
        Ok(state
            .menus
            .get(id)
            .map(|menu| state.assembled_menu(menu, false)))
    }

    async fn find_active_menu(&self, location: &str) -> RepoResult<Option<Menu>> {
        let state = self.read()?;
        Ok(state
            .menus
            .iter()
            .find(|menu| menu.location == location && menu.is_active)
            .map(|menu| state.assembled_menu(menu.clone(), true)))
    }

    async fn create_menu(&self, menu: &MenuInput) -> RepoResult<Menu> {
        let now = Utc::now();
        Ok(self.write()?.menus.insert_with(|id| Menu {
            id,
            name: menu.name.trim().to_string(),
            location: menu.location.trim().to_string(),
            is_active: menu.is_active,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }))
    }

    async fn update_menu(&self, id: i64, menu: &MenuInput) -> RepoResult<Option<Menu>> {
        let mut state = self.write()?;
        let updated = state.menus.update(id, |stored| {
            stored.name = menu.name.trim().to_string();
            stored.location = menu.location.trim().to_string();
            stored.is_active = menu.is_active;
            stored.updated_at = Utc::now();
        });
        Ok(updated.map(|menu| state.assembled_menu(menu, false)))
    }

    async fn delete_menu(&self, id: i64) -> RepoResult<bool> {
        let mut state = self.write()?;
        if !state.menus.remove(id) {
            return Ok(false);
        }
        state.menu_items.rows.retain(|_, item| item.menu_id != id);
        Ok(true)
    }

    async fn list_menu_items(&self, menu_id: i64) -> RepoResult<Vec<MenuItem>> {
        let mut items: Vec<MenuItem> = self
            .read()?
            .menu_items
            .iter()
            .filter(|item| item.menu_id == menu_id)
            .cloned()
            .collect();
        items.sort_by_key(|item| (item.sort_order, item.id));
        Ok(items)
    }

    async fn create_menu_item(&self, menu_id: i64, item: &MenuItemInput) -> RepoResult<MenuItem> {
        let mut state = self.write()?;
        if state.menus.get(menu_id).is_none() {
            return Err(RepoError::NotFound);
        }
        if let Some(parent_id) = item.parent_id {
            if state.menu_items.get(parent_id).is_none() {
                return Err(RepoError::NotFound);
            }
        }
        let now = Utc::now();
        Ok(state.menu_items.insert_with(|id| MenuItem {
            id,
            menu_id,
            parent_id: item.parent_id,
            label: item.label.trim().to_string(),
            url: item.url.trim().to_string(),
            target: item.target.clone(),
            icon_class: item.icon_class.clone(),
            sort_order: item.sort_order,
            is_active: item.is_active,
            children: Vec::new(),
            created_at: now,
            updated_at: now,
        }))
    }

    async fn update_menu_item(
        &self,
        id: i64,
        item: &MenuItemInput,
    ) -> RepoResult<Option<MenuItem>> {
        Ok(self.write()?.menu_items.update(id, |stored| {
            stored.parent_id = item.parent_id;
            stored.label = item.label.trim().to_string();
            stored.url = item.url.trim().to_string();
            stored.target.clone_from(&item.target);
            stored.icon_class.clone_from(&item.icon_class);
            stored.sort_order = item.sort_order;
            stored.is_active = item.is_active;
            stored.updated_at = Utc::now();
        }))
    }

    async fn delete_menu_item(&self, id: i64) -> RepoResult<bool> {
        let mut state = self.write()?;
        if !state.menu_items.remove(id) {
            return Ok(false);
        }
        // Descendants go with their parent.
        let mut doomed = vec![id];
        while let Some(parent) = doomed.pop() {
            let children: Vec<i64> = state
                .menu_items
                .iter()
                .filter(|item| item.parent_id == Some(parent))
                .map(|item| item.id)
                .collect();
            for child in children {
                state.menu_items.remove(child);
                doomed.push(child);
            }
        }
        Ok(true)
    }
}
