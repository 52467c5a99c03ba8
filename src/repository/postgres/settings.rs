use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};

use super::PostgresRepository;
use crate::{
    models::{CreateSettingRequest, Setting, SettingBatchItem, SettingQuery, UpdateSettingRequest},
    repository::{RepoResult, SettingRepository},
};

#[async_trait]
impl SettingRepository for PostgresRepository {
    async fn list_settings(&self, query: &SettingQuery) -> RepoResult<Vec<Setting>> {
        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM settings WHERE TRUE");
        if let Some(group) = &query.group {
            select.push(" AND setting_group = ").push_bind(group.clone());
        }
        if let Some(is_public) = query.is_public {
            select.push(" AND is_public = ").push_bind(is_public);
        }
        select.push(" ORDER BY setting_group, sort_order, key");
        let settings = select.build_query_as::<Setting>().fetch_all(&self.pool).await?;
        Ok(settings)
    }

    async fn get_setting(&self, key: &str) -> RepoResult<Option<Setting>> {
        let setting = sqlx::query_as::<_, Setting>("SELECT * FROM settings WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(setting)
    }

    async fn create_setting(&self, setting: &CreateSettingRequest) -> RepoResult<Setting> {
        let created = sqlx::query_as::<_, Setting>(
            r#"
            INSERT INTO settings (
                key, value, setting_type, setting_group, label, description, is_public, sort_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(setting.key.trim())
        .bind(&setting.value)
        .bind(&setting.setting_type)
        .bind(&setting.group)
        .bind(&setting.label)
        .bind(&setting.description)
        .bind(setting.is_public)
        .bind(setting.sort_order)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_setting(
        &self,
        key: &str,
        changes: &UpdateSettingRequest,
    ) -> RepoResult<Option<Setting>> {
        let updated = sqlx::query_as::<_, Setting>(
            r#"
            UPDATE settings SET
                value         = COALESCE($2, value),
                setting_type  = COALESCE($3, setting_type),
                setting_group = COALESCE($4, setting_group),
                label         = COALESCE($5, label),
                description   = COALESCE($6, description),
                is_public     = COALESCE($7, is_public),
                sort_order    = COALESCE($8, sort_order),
                updated_at    = NOW()
            WHERE key = $1
            RETURNING *
            "#,
        )
        .bind(key)
        .bind(&changes.value)
        .bind(&changes.setting_type)
        .bind(&changes.group)
        .bind(&changes.label)
        .bind(&changes.description)
        .bind(changes.is_public)
        .bind(changes.sort_order)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn update_settings_batch(&self, items: &[SettingBatchItem]) -> RepoResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut updated = 0;
        for item in items {
            let result = sqlx::query(
                r#"
                UPDATE settings SET
                    value         = $2,
                    setting_type  = COALESCE($3, setting_type),
                    setting_group = COALESCE($4, setting_group),
                    label         = COALESCE($5, label),
                    description   = COALESCE($6, description),
                    is_public     = COALESCE($7, is_public),
                    sort_order    = COALESCE($8, sort_order),
                    updated_at    = NOW()
                WHERE key = $1
                "#,
            )
            .bind(&item.key)
            .bind(&item.value)
            .bind(&item.setting_type)
            .bind(&item.group)
            .bind(&item.label)
            .bind(&item.description)
            .bind(item.is_public)
            .bind(item.sort_order)
            .execute(&mut *tx)
            .await?;
            updated += result.rows_affected();
        }
        // Dropping `tx` on an early return above rolls the batch back.
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_setting(&self, key: &str) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM settings WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
