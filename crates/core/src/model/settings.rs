use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Per-user preferences, replaced wholesale on every save.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct UserSettings {
    study_reminders: bool,
    dark_mode: bool,
    privacy_mode: bool,
    notification_preferences: Map<String, Value>,
    theme_preferences: Map<String, Value>,
    study_schedule: Map<String, Value>,
}

/// Unvalidated settings as submitted by a client.
///
/// Missing flags default to `false`; missing or `null` preference blobs
/// default to an empty object.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserSettingsDraft {
    pub study_reminders: Option<bool>,
    pub dark_mode: Option<bool>,
    pub privacy_mode: Option<bool>,
    pub notification_preferences: Option<Value>,
    pub theme_preferences: Option<Value>,
    pub study_schedule: Option<Value>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("{field} must be a JSON object")]
    NotAnObject { field: &'static str },
}

impl UserSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft into persisted settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::NotAnObject` if a preference blob is present
    /// but is not a JSON object.
    pub fn validate(self) -> Result<UserSettings, SettingsError> {
        Ok(UserSettings {
            study_reminders: self.study_reminders.unwrap_or(false),
            dark_mode: self.dark_mode.unwrap_or(false),
            privacy_mode: self.privacy_mode.unwrap_or(false),
            notification_preferences: into_object(
                "notification_preferences",
                self.notification_preferences,
            )?,
            theme_preferences: into_object("theme_preferences", self.theme_preferences)?,
            study_schedule: into_object("study_schedule", self.study_schedule)?,
        })
    }
}

impl UserSettings {
    /// Rebuild settings from stored columns; blobs are stored as JSON text.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if a stored blob is not a JSON object.
    pub fn from_persisted(
        study_reminders: bool,
        dark_mode: bool,
        privacy_mode: bool,
        notification_preferences: Value,
        theme_preferences: Value,
        study_schedule: Value,
    ) -> Result<Self, SettingsError> {
        UserSettingsDraft {
            study_reminders: Some(study_reminders),
            dark_mode: Some(dark_mode),
            privacy_mode: Some(privacy_mode),
            notification_preferences: Some(notification_preferences),
            theme_preferences: Some(theme_preferences),
            study_schedule: Some(study_schedule),
        }
        .validate()
    }

    #[must_use]
    pub fn study_reminders(&self) -> bool {
        self.study_reminders
    }

    #[must_use]
    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    #[must_use]
    pub fn privacy_mode(&self) -> bool {
        self.privacy_mode
    }

    #[must_use]
    pub fn notification_preferences(&self) -> &Map<String, Value> {
        &self.notification_preferences
    }

    #[must_use]
    pub fn theme_preferences(&self) -> &Map<String, Value> {
        &self.theme_preferences
    }

    #[must_use]
    pub fn study_schedule(&self) -> &Map<String, Value> {
        &self.study_schedule
    }
}

fn into_object(field: &'static str, value: Option<Value>) -> Result<Map<String, Value>, SettingsError> {
    match value {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(SettingsError::NotAnObject { field }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_draft_yields_defaults() {
        let settings = UserSettingsDraft::new().validate().unwrap();
        assert_eq!(settings, UserSettings::default());
        assert!(settings.study_schedule().is_empty());
    }

    #[test]
    fn draft_deserializes_partial_payload() {
        let draft: UserSettingsDraft = serde_json::from_value(json!({
            "dark_mode": true,
            "study_schedule": {"monday": ["09:00"]}
        }))
        .unwrap();
        let settings = draft.validate().unwrap();
        assert!(settings.dark_mode());
        assert!(!settings.study_reminders());
        assert_eq!(settings.study_schedule()["monday"], json!(["09:00"]));
    }

    #[test]
    fn non_object_blob_is_rejected() {
        let draft = UserSettingsDraft {
            theme_preferences: Some(json!("dark")),
            ..UserSettingsDraft::default()
        };
        assert_eq!(
            draft.validate().unwrap_err(),
            SettingsError::NotAnObject {
                field: "theme_preferences"
            }
        );
    }
}
