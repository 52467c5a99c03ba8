use async_trait::async_trait;
use chrono::Utc;

use super::{MemoryRepository, Table};
use crate::{
    models::{
        CreateSettingRequest, Setting, SettingBatchItem, SettingQuery, UpdateSettingRequest,
        setting::is_known_type,
    },
    repository::{RepoError, RepoResult, SettingRepository, constraints},
};

fn check_type(setting_type: &str) -> RepoResult<()> {
    if is_known_type(setting_type) {
        Ok(())
    } else {
        Err(RepoError::check_failed(constraints::SETTING_TYPE))
    }
}

fn find_id(settings: &Table<Setting>, key: &str) -> Option<i64> {
    settings
        .iter()
        .find(|setting| setting.key == key)
        .map(|setting| setting.id)
}

#[async_trait]
impl SettingRepository for MemoryRepository {
    async fn list_settings(&self, query: &SettingQuery) -> RepoResult<Vec<Setting>> {
        let state = self.read()?;
        let mut settings: Vec<Setting> = state
            .settings
            .iter()
            .filter(|setting| query.group.as_ref().is_none_or(|group| &setting.group == group))
            .filter(|setting| query.is_public.is_none_or(|public| setting.is_public == public))
            .cloned()
            .collect();
        settings.sort_by(|a, b| {
            (&a.group, a.sort_order, &a.key).cmp(&(&b.group, b.sort_order, &b.key))
        });
        Ok(settings)
    }

    async fn get_setting(&self, key: &str) -> RepoResult<Option<Setting>> {
        let state = self.read()?;
        Ok(find_id(&state.settings, key).and_then(|id| state.settings.get(id)))
    }

    async fn create_setting(&self, setting: &CreateSettingRequest) -> RepoResult<Setting> {
        let mut state = self.write()?;
        let key = setting.key.trim();
        if find_id(&state.settings, key).is_some() {
            return Err(RepoError::conflict(constraints::SETTING_KEY));
        }
        check_type(&setting.setting_type)?;
        let now = Utc::now();
        Ok(state.settings.insert_with(|id| Setting {
            id,
            key: key.to_string(),
            value: setting.value.clone(),
            setting_type: setting.setting_type.clone(),
            group: setting.group.clone(),
            label: setting.label.clone(),
            description: setting.description.clone(),
            is_public: setting.is_public,
            sort_order: setting.sort_order,
            created_at: now,
            updated_at: now,
        }))
    }

    async fn update_setting(
        &self,
        key: &str,
        changes: &UpdateSettingRequest,
    ) -> RepoResult<Option<Setting>> {
        if let Some(setting_type) = &changes.setting_type {
            check_type(setting_type)?;
        }
        let mut state = self.write()?;
        let Some(id) = find_id(&state.settings, key) else {
            return Ok(None);
        };
        Ok(state.settings.update(id, |setting| {
            if let Some(value) = &changes.value {
                setting.value.clone_from(value);
            }
            if let Some(setting_type) = &changes.setting_type {
                setting.setting_type.clone_from(setting_type);
            }
            if let Some(group) = &changes.group {
                setting.group.clone_from(group);
            }
            if let Some(label) = &changes.label {
                setting.label.clone_from(label);
            }
            if let Some(description) = &changes.description {
                setting.description.clone_from(description);
            }
            if let Some(is_public) = changes.is_public {
                setting.is_public = is_public;
            }
            if let Some(sort_order) = changes.sort_order {
                setting.sort_order = sort_order;
            }
            setting.updated_at = Utc::now();
        }))
    }

    async fn update_settings_batch(&self, items: &[SettingBatchItem]) -> RepoResult<u64> {
        let mut state = self.write()?;
        // Changes land on a copy and replace the table only if every item applies.
        let mut staged = state.settings.clone();
        let mut updated = 0;
        let now = Utc::now();
        for item in items {
            let Some(id) = find_id(&staged, &item.key) else {
                continue;
            };
            if let Some(setting_type) = &item.setting_type {
                check_type(setting_type)?;
            }
            staged.update(id, |setting| {
                setting.value.clone_from(&item.value);
                if let Some(setting_type) = &item.setting_type {
                    setting.setting_type.clone_from(setting_type);
                }
                if let Some(group) = &item.group {
                    setting.group.clone_from(group);
                }
                if let Some(label) = &item.label {
                    setting.label.clone_from(label);
                }
                if let Some(description) = &item.description {
                    setting.description.clone_from(description);
                }
                if let Some(is_public) = item.is_public {
                    setting.is_public = is_public;
                }
                if let Some(sort_order) = item.sort_order {
                    setting.sort_order = sort_order;
                }
                setting.updated_at = now;
            });
            updated += 1;
        }
        state.settings = staged;
        Ok(updated)
    }

    async fn delete_setting(&self, key: &str) -> RepoResult<bool> {
        let mut state = self.write()?;
        match find_id(&state.settings, key) {
            Some(id) => Ok(state.settings.remove(id)),
            None => Ok(false),
        }
    }
}
