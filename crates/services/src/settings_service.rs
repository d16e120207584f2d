use std::sync::Arc;

use storage::repository::SettingsRepository;
use tracker_core::model::{UserId, UserSettings, UserSettingsDraft};

use crate::error::SettingsServiceError;

#[derive(Clone)]
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted settings (or defaults if missing).
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn load(&self, user_id: &UserId) -> Result<UserSettings, SettingsServiceError> {
        let settings = self.repo.get_settings(user_id).await?;
        Ok(settings.unwrap_or_default())
    }

    /// Validate and persist new settings, replacing the stored ones.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` if validation fails or persistence fails.
    pub async fn save(
        &self,
        user_id: &UserId,
        draft: UserSettingsDraft,
    ) -> Result<UserSettings, SettingsServiceError> {
        self.store(user_id, draft.validate()?).await
    }

    /// Persist settings that were validated up front, replacing the stored ones.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` if persistence fails.
    pub async fn store(
        &self,
        user_id: &UserId,
        settings: UserSettings,
    ) -> Result<UserSettings, SettingsServiceError> {
        self.repo.save_settings(user_id, &settings).await?;
        tracing::debug!(user_id = %user_id, "settings saved");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn missing_settings_load_as_defaults() {
        let svc = SettingsService::new(Arc::new(InMemoryRepository::new()));
        let settings = svc.load(&UserId::new("u1").unwrap()).await.unwrap();
        assert_eq!(settings, UserSettings::default());
    }

    #[tokio::test]
    async fn invalid_blob_is_not_saved() {
        let repo = InMemoryRepository::new();
        let svc = SettingsService::new(Arc::new(repo.clone()));
        let user = UserId::new("u1").unwrap();
        let draft: UserSettingsDraft =
            serde_json::from_value(json!({"study_schedule": [1, 2]})).unwrap();

        let err = svc.save(&user, draft).await.unwrap_err();
        assert!(matches!(err, SettingsServiceError::Settings(_)));
        assert!(repo.get_settings(&user).await.unwrap().is_none());
    }
}
