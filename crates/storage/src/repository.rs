use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracker_core::model::{
    ActivityEntry, NewSession, ProgressSummary, ProgressTree, SessionId, StudySession, TopicKey,
    TopicProgress, UserId, UserSelection, UserSettings, UserStatistics,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("storage timed out")]
    Timeout,

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// Whether the same call may succeed if repeated later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::Connection(_) | StorageError::Timeout)
    }
}

/// Per-user topic progress rows, unique on (user, exam, subject, topic).
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Insert the row or overwrite its flags and `completed_at`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn upsert_topic(&self, user_id: &UserId, row: &TopicProgress)
    -> Result<(), StorageError>;

    /// Insert a zeroed row unless one already exists. Returns whether a row was created.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn seed_topic(&self, user_id: &UserId, key: &TopicKey) -> Result<bool, StorageError>;

    /// Fetch one row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures; a missing row is `Ok(None)`.
    async fn get_topic(
        &self,
        user_id: &UserId,
        key: &TopicKey,
    ) -> Result<Option<TopicProgress>, StorageError>;

    /// Fetch all rows for the user, optionally restricted to one exam.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures; no rows is an empty tree.
    async fn get_progress(
        &self,
        user_id: &UserId,
        exam: Option<&str>,
    ) -> Result<ProgressTree, StorageError>;
}

#[async_trait]
pub trait SelectionRepository: Send + Sync {
    /// Replace the user's selection wholesale.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the selection cannot be stored.
    async fn save_selection(&self, selection: &UserSelection) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_selection(&self, user_id: &UserId) -> Result<Option<UserSelection>, StorageError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a newly opened session and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn insert_session(&self, session: &NewSession) -> Result<SessionId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on storage failures; an unknown id is `Ok(None)`.
    async fn get_session(&self, id: SessionId) -> Result<Option<StudySession>, StorageError>;

    /// Write end time, duration and notes of a finished session.
    ///
    /// Only applies to sessions still open in storage; returns `false` when
    /// the session was already closed (or unknown) and nothing changed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn finish_session(&self, session: &StudySession) -> Result<bool, StorageError>;

    /// Number of the user's sessions started at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn count_sessions_since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<u32, StorageError>;
}

#[async_trait]
pub trait StatisticsRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_statistics(&self, user_id: &UserId)
    -> Result<Option<UserStatistics>, StorageError>;

    /// Atomically add study minutes and stamp the last study date.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn add_study_time(
        &self,
        user_id: &UserId,
        minutes: u32,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Store the progress-derived counters of a fresh recompute.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn record_progress_counts(
        &self,
        user_id: &UserId,
        summary: &ProgressSummary,
    ) -> Result<(), StorageError>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_settings(&self, user_id: &UserId) -> Result<Option<UserSettings>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn save_settings(
        &self,
        user_id: &UserId,
        settings: &UserSettings,
    ) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Append an entry and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn append_activity(&self, entry: &ActivityEntry) -> Result<i64, StorageError>;

    /// Newest entries first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn recent_activity(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<ActivityEntry>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<HashMap<(UserId, TopicKey), TopicProgress>>>,
    selections: Arc<Mutex<HashMap<UserId, UserSelection>>>,
    sessions: Arc<Mutex<Vec<StudySession>>>,
    statistics: Arc<Mutex<HashMap<UserId, UserStatistics>>>,
    settings: Arc<Mutex<HashMap<UserId, UserSettings>>>,
    activity: Arc<Mutex<Vec<ActivityEntry>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::Connection(e.to_string()))
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn upsert_topic(
        &self,
        user_id: &UserId,
        row: &TopicProgress,
    ) -> Result<(), StorageError> {
        let mut guard = lock(&self.progress)?;
        guard.insert((user_id.clone(), row.key().clone()), row.clone());
        Ok(())
    }

    async fn seed_topic(&self, user_id: &UserId, key: &TopicKey) -> Result<bool, StorageError> {
        let mut guard = lock(&self.progress)?;
        let entry = (user_id.clone(), key.clone());
        if guard.contains_key(&entry) {
            return Ok(false);
        }
        guard.insert(entry, TopicProgress::zeroed(key.clone()));
        Ok(true)
    }

    async fn get_topic(
        &self,
        user_id: &UserId,
        key: &TopicKey,
    ) -> Result<Option<TopicProgress>, StorageError> {
        let guard = lock(&self.progress)?;
        Ok(guard.get(&(user_id.clone(), key.clone())).cloned())
    }

    async fn get_progress(
        &self,
        user_id: &UserId,
        exam: Option<&str>,
    ) -> Result<ProgressTree, StorageError> {
        let guard = lock(&self.progress)?;
        Ok(guard
            .iter()
            .filter(|((owner, key), _)| {
                owner == user_id && exam.is_none_or(|exam| key.exam() == exam)
            })
            .map(|(_, row)| row.clone())
            .collect())
    }
}

#[async_trait]
impl SelectionRepository for InMemoryRepository {
    async fn save_selection(&self, selection: &UserSelection) -> Result<(), StorageError> {
        let mut guard = lock(&self.selections)?;
        guard.insert(selection.user_id().clone(), selection.clone());
        Ok(())
    }

    async fn get_selection(&self, user_id: &UserId) -> Result<Option<UserSelection>, StorageError> {
        let guard = lock(&self.selections)?;
        Ok(guard.get(user_id).cloned())
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn insert_session(&self, session: &NewSession) -> Result<SessionId, StorageError> {
        let mut guard = lock(&self.sessions)?;
        let next = u64::try_from(guard.len())
            .map_err(|_| StorageError::Serialization("session id overflow".into()))?
            + 1;
        let id = SessionId::new(next);
        guard.push(StudySession::open(id, session.clone()));
        Ok(id)
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<StudySession>, StorageError> {
        let guard = lock(&self.sessions)?;
        Ok(guard.iter().find(|s| s.id() == id).cloned())
    }

    async fn finish_session(&self, session: &StudySession) -> Result<bool, StorageError> {
        let mut guard = lock(&self.sessions)?;
        match guard.iter_mut().find(|s| s.id() == session.id()) {
            Some(stored) if !stored.is_ended() => {
                *stored = session.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn count_sessions_since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<u32, StorageError> {
        let guard = lock(&self.sessions)?;
        let n = guard
            .iter()
            .filter(|s| s.user_id() == user_id && s.started_at() >= since)
            .count();
        Ok(u32::try_from(n).unwrap_or(u32::MAX))
    }
}

#[async_trait]
impl StatisticsRepository for InMemoryRepository {
    async fn get_statistics(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserStatistics>, StorageError> {
        let guard = lock(&self.statistics)?;
        Ok(guard.get(user_id).cloned())
    }

    async fn add_study_time(
        &self,
        user_id: &UserId,
        minutes: u32,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = lock(&self.statistics)?;
        guard
            .entry(user_id.clone())
            .or_insert_with(|| UserStatistics::empty(user_id.clone()))
            .add_study_time(minutes, at);
        Ok(())
    }

    async fn record_progress_counts(
        &self,
        user_id: &UserId,
        summary: &ProgressSummary,
    ) -> Result<(), StorageError> {
        let mut guard = lock(&self.statistics)?;
        guard
            .entry(user_id.clone())
            .or_insert_with(|| UserStatistics::empty(user_id.clone()))
            .apply_summary(summary);
        Ok(())
    }
}

#[async_trait]
impl SettingsRepository for InMemoryRepository {
    async fn get_settings(&self, user_id: &UserId) -> Result<Option<UserSettings>, StorageError> {
        let guard = lock(&self.settings)?;
        Ok(guard.get(user_id).cloned())
    }

    async fn save_settings(
        &self,
        user_id: &UserId,
        settings: &UserSettings,
    ) -> Result<(), StorageError> {
        let mut guard = lock(&self.settings)?;
        guard.insert(user_id.clone(), settings.clone());
        Ok(())
    }
}

#[async_trait]
impl ActivityRepository for InMemoryRepository {
    async fn append_activity(&self, entry: &ActivityEntry) -> Result<i64, StorageError> {
        let mut guard = lock(&self.activity)?;
        let id = i64::try_from(guard.len())
            .map_err(|_| StorageError::Serialization("activity id overflow".into()))?
            + 1;
        let mut stored = entry.clone();
        stored.id = Some(id);
        guard.push(stored);
        Ok(id)
    }

    async fn recent_activity(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<ActivityEntry>, StorageError> {
        let guard = lock(&self.activity)?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let mut entries: Vec<ActivityEntry> = guard
            .iter()
            .filter(|e| &e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        entries.truncate(limit);
        Ok(entries)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub selections: Arc<dyn SelectionRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub statistics: Arc<dyn StatisticsRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub activity: Arc<dyn ActivityRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            progress: Arc::new(repo.clone()),
            selections: Arc::new(repo.clone()),
            sessions: Arc::new(repo.clone()),
            statistics: Arc::new(repo.clone()),
            settings: Arc::new(repo.clone()),
            activity: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::model::{SessionType, TopicStatus};
    use tracker_core::time::fixed_now;

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    fn waves() -> TopicKey {
        TopicKey::new("JEE", "Physics", "Waves and Sound").unwrap()
    }

    #[tokio::test]
    async fn upsert_is_idempotent() {
        let repo = InMemoryRepository::new();
        let row = TopicProgress::record(waves(), TopicStatus::new(true, false, false), fixed_now());
        repo.upsert_topic(&user(), &row).await.unwrap();
        let first = repo.get_progress(&user(), Some("JEE")).await.unwrap();
        repo.upsert_topic(&user(), &row).await.unwrap();
        let second = repo.get_progress(&user(), Some("JEE")).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(second.rows().count(), 1);
    }

    #[tokio::test]
    async fn seed_never_overwrites_progress() {
        let repo = InMemoryRepository::new();
        let row = TopicProgress::record(waves(), TopicStatus::all_done(), fixed_now());
        repo.upsert_topic(&user(), &row).await.unwrap();

        assert!(!repo.seed_topic(&user(), &waves()).await.unwrap());
        let stored = repo.get_topic(&user(), &waves()).await.unwrap().unwrap();
        assert!(stored.is_complete());
    }

    #[tokio::test]
    async fn progress_is_scoped_by_user_and_exam() {
        let repo = InMemoryRepository::new();
        repo.seed_topic(&user(), &waves()).await.unwrap();
        repo.seed_topic(&user(), &TopicKey::new("NEET", "Biology", "Evolution").unwrap())
            .await
            .unwrap();
        let other = UserId::new("u2").unwrap();

        assert_eq!(repo.get_progress(&user(), None).await.unwrap().rows().count(), 2);
        assert_eq!(repo.get_progress(&user(), Some("NEET")).await.unwrap().rows().count(), 1);
        assert!(repo.get_progress(&other, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn finish_session_applies_once() {
        let repo = InMemoryRepository::new();
        let new = NewSession::new(user(), "JEE", None, None, SessionType::Study, fixed_now()).unwrap();
        let id = repo.insert_session(&new).await.unwrap();

        let mut session = repo.get_session(id).await.unwrap().unwrap();
        session
            .finish(fixed_now() + chrono::Duration::minutes(4), None)
            .unwrap();
        assert!(repo.finish_session(&session).await.unwrap());
        assert!(!repo.finish_session(&session).await.unwrap());
        assert_eq!(repo.get_session(id).await.unwrap().unwrap().duration_minutes(), 4);
    }

    #[tokio::test]
    async fn recent_activity_is_newest_first_and_capped() {
        let repo = InMemoryRepository::new();
        for minute in 0..5 {
            let entry = ActivityEntry::new(
                user(),
                "timer_started",
                fixed_now() + chrono::Duration::minutes(minute),
            )
            .unwrap();
            repo.append_activity(&entry).await.unwrap();
        }
        let recent = repo.recent_activity(&user(), 3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].created_at, fixed_now() + chrono::Duration::minutes(4));
    }
}
