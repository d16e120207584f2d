use std::sync::Arc;

use serde_json::Value;
use storage::repository::ActivityRepository;
use tracker_core::Clock;
use tracker_core::model::{ActivityEntry, RECENT_ACTIVITY_LIMIT, UserId};

use crate::error::ActivityServiceError;

/// A client-reported activity.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub user_id: UserId,
    pub activity_type: String,
    pub activity_data: Value,
    pub exam: Option<String>,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub session_duration: u32,
}

#[derive(Clone)]
pub struct ActivityService {
    clock: Clock,
    repo: Arc<dyn ActivityRepository>,
}

impl ActivityService {
    #[must_use]
    pub fn new(clock: Clock, repo: Arc<dyn ActivityRepository>) -> Self {
        Self { clock, repo }
    }

    /// Append an entry stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns `ActivityServiceError::Activity` if the type is blank.
    /// Returns `ActivityServiceError::Storage` if persistence fails.
    pub async fn log(&self, activity: NewActivity) -> Result<ActivityEntry, ActivityServiceError> {
        let mut entry = ActivityEntry::new(activity.user_id, activity.activity_type, self.clock.now())?
            .with_data(activity.activity_data)
            .with_scope(activity.exam, activity.subject, activity.topic)
            .with_duration(activity.session_duration);
        entry.id = Some(self.repo.append_activity(&entry).await?);
        Ok(entry)
    }

    /// The newest entries, at most [`RECENT_ACTIVITY_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns `ActivityServiceError::Storage` if repository access fails.
    pub async fn recent(&self, user_id: &UserId) -> Result<Vec<ActivityEntry>, ActivityServiceError> {
        Ok(self
            .repo
            .recent_activity(user_id, RECENT_ACTIVITY_LIMIT)
            .await?)
    }
}
