use async_trait::async_trait;
use tracker_core::model::{UserId, UserSettings};

use super::SqliteRepository;
use super::mapping::{db, map_settings_row, ser};
use crate::repository::{SettingsRepository, StorageError};

#[async_trait]
impl SettingsRepository for SqliteRepository {
    async fn get_settings(&self, user_id: &UserId) -> Result<Option<UserSettings>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT
                study_reminders,
                dark_mode,
                privacy_mode,
                notification_preferences,
                theme_preferences,
                study_schedule
            FROM user_settings
            WHERE user_id = ?1
            ",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?;

        row.as_ref().map(map_settings_row).transpose()
    }

    async fn save_settings(
        &self,
        user_id: &UserId,
        settings: &UserSettings,
    ) -> Result<(), StorageError> {
        let notification = serde_json::to_string(settings.notification_preferences()).map_err(ser)?;
        let theme = serde_json::to_string(settings.theme_preferences()).map_err(ser)?;
        let schedule = serde_json::to_string(settings.study_schedule()).map_err(ser)?;

        sqlx::query(
            r"
            INSERT INTO user_settings (
                user_id,
                study_reminders,
                dark_mode,
                privacy_mode,
                notification_preferences,
                theme_preferences,
                study_schedule
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(user_id) DO UPDATE SET
                study_reminders = excluded.study_reminders,
                dark_mode = excluded.dark_mode,
                privacy_mode = excluded.privacy_mode,
                notification_preferences = excluded.notification_preferences,
                theme_preferences = excluded.theme_preferences,
                study_schedule = excluded.study_schedule
            ",
        )
        .bind(user_id.as_str())
        .bind(settings.study_reminders())
        .bind(settings.dark_mode())
        .bind(settings.privacy_mode())
        .bind(notification)
        .bind(theme)
        .bind(schedule)
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(())
    }
}
