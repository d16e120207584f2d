use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::model::UserId;

/// Listing cap for recent activity.
pub const RECENT_ACTIVITY_LIMIT: u32 = 50;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ActivityError {
    #[error("activity type cannot be empty")]
    EmptyType,
}

/// One entry of a user's activity feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub user_id: UserId,
    pub activity_type: String,
    pub activity_data: Value,
    pub exam: Option<String>,
    pub subject: Option<String>,
    pub topic: Option<String>,
    /// Minutes.
    pub session_duration: u32,
    pub created_at: DateTime<Utc>,
}

impl ActivityEntry {
    /// # Errors
    ///
    /// Returns `ActivityError::EmptyType` if `activity_type` is blank.
    pub fn new(
        user_id: UserId,
        activity_type: impl AsRef<str>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ActivityError> {
        let activity_type = activity_type.as_ref().trim();
        if activity_type.is_empty() {
            return Err(ActivityError::EmptyType);
        }
        Ok(Self {
            id: None,
            user_id,
            activity_type: activity_type.to_owned(),
            activity_data: Value::Object(serde_json::Map::new()),
            exam: None,
            subject: None,
            topic: None,
            session_duration: 0,
            created_at,
        })
    }

    /// The feed entry written after a progress save.
    #[must_use]
    pub fn progress_update(user_id: UserId, exam: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            user_id,
            activity_type: "progress_update".to_owned(),
            activity_data: serde_json::json!({
                "description": format!("Updated progress in {}", exam.to_uppercase()),
            }),
            exam: Some(exam.to_owned()),
            subject: None,
            topic: None,
            session_duration: 0,
            created_at,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.activity_data = data;
        self
    }

    #[must_use]
    pub fn with_scope(
        mut self,
        exam: Option<String>,
        subject: Option<String>,
        topic: Option<String>,
    ) -> Self {
        self.exam = exam.filter(|v| !v.trim().is_empty());
        self.subject = subject.filter(|v| !v.trim().is_empty());
        self.topic = topic.filter(|v| !v.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.session_duration = minutes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn progress_update_describes_exam() {
        let entry = ActivityEntry::progress_update(UserId::new("u1").unwrap(), "neet", fixed_now());
        assert_eq!(entry.activity_type, "progress_update");
        assert_eq!(entry.activity_data["description"], "Updated progress in NEET");
        assert_eq!(entry.exam.as_deref(), Some("neet"));
    }

    #[test]
    fn blank_type_is_rejected() {
        let err = ActivityEntry::new(UserId::new("u1").unwrap(), " ", fixed_now()).unwrap_err();
        assert_eq!(err, ActivityError::EmptyType);
    }
}
