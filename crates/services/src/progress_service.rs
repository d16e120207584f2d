use std::sync::Arc;

use serde_json::Value;
use storage::repository::{ActivityRepository, ProgressRepository};
use tracker_core::Clock;
use tracker_core::model::{
    ActivityEntry, ProgressSummary, ProgressTree, TopicKey, TopicProgress, TopicStatus, UserId,
};

use crate::error::ProgressServiceError;
use crate::gateway::{self, StatusChange, UpdateBatch};
use crate::statistics::StatisticsAggregator;

/// Result of applying one update batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyOutcome {
    pub user_id: UserId,
    pub exam: Option<String>,
    pub applied: u32,
    pub skipped: u32,
    pub summary: ProgressSummary,
}

/// Applies normalized progress updates and keeps statistics in step.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
    activity: Arc<dyn ActivityRepository>,
    statistics: Arc<StatisticsAggregator>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        progress: Arc<dyn ProgressRepository>,
        activity: Arc<dyn ActivityRepository>,
        statistics: Arc<StatisticsAggregator>,
    ) -> Self {
        Self {
            clock,
            progress,
            activity,
            statistics,
        }
    }

    /// Save a form submission and record a `progress_update` activity.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Payload` if the exam or user id is missing.
    /// Returns `ProgressServiceError::Storage` if persistence fails.
    pub async fn save_form(
        &self,
        fields: &[(String, String)],
    ) -> Result<ApplyOutcome, ProgressServiceError> {
        let batch = gateway::parse_form(fields)?;
        self.save_and_log(&batch).await
    }

    /// Save a nested JSON submission and record a `progress_update` activity.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Payload` for malformed bodies.
    /// Returns `ProgressServiceError::Storage` if persistence fails.
    pub async fn save_nested(&self, body: &Value) -> Result<ApplyOutcome, ProgressServiceError> {
        let batch = gateway::parse_nested(body)?;
        self.save_and_log(&batch).await
    }

    /// Merge only the submitted categories into stored rows for one exam.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Payload` for malformed bodies.
    /// Returns `ProgressServiceError::Storage` if persistence fails.
    pub async fn merge_patch(
        &self,
        user_id: &str,
        exam: &str,
        body: &Value,
    ) -> Result<ApplyOutcome, ProgressServiceError> {
        let batch = gateway::parse_patch(user_id, exam, body)?;
        self.apply(&batch).await
    }

    /// Upsert every entry of `batch` in order, then recompute statistics.
    ///
    /// Later entries for the same topic overwrite earlier ones. A storage
    /// failure stops the batch; rows written before it stay written.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` or `ProgressServiceError::Statistics`
    /// on storage failures.
    pub async fn apply(&self, batch: &UpdateBatch) -> Result<ApplyOutcome, ProgressServiceError> {
        let now = self.clock.now();
        let mut applied = 0_u32;

        for update in &batch.entries {
            let status = match update.change {
                StatusChange::Replace(status) => status,
                StatusChange::Merge(patch) => {
                    let stored = self
                        .progress
                        .get_topic(&batch.user_id, &update.key)
                        .await?
                        .map(|row| row.status())
                        .unwrap_or_default();
                    patch.apply_to(stored)
                }
            };
            let row = TopicProgress::record(update.key.clone(), status, now);
            self.progress.upsert_topic(&batch.user_id, &row).await?;
            applied += 1;
        }

        let summary = self.statistics.recompute(&batch.user_id).await?;
        tracing::info!(
            user_id = %batch.user_id,
            exam = batch.exam.as_deref().unwrap_or("*"),
            applied,
            skipped = batch.skipped,
            "progress batch applied"
        );
        Ok(ApplyOutcome {
            user_id: batch.user_id.clone(),
            exam: batch.exam.clone(),
            applied,
            skipped: batch.skipped,
            summary,
        })
    }

    /// Flip a topic's overall completion.
    ///
    /// A fully completed topic is reset to all-false; anything else, including
    /// a topic with no row yet, becomes all-true.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` or `ProgressServiceError::Statistics`
    /// on storage failures.
    pub async fn toggle(
        &self,
        user_id: &UserId,
        key: &TopicKey,
    ) -> Result<TopicProgress, ProgressServiceError> {
        let was_complete = self
            .progress
            .get_topic(user_id, key)
            .await?
            .is_some_and(|row| row.is_complete());
        let status = if was_complete {
            TopicStatus::default()
        } else {
            TopicStatus::all_done()
        };
        let row = TopicProgress::record(key.clone(), status, self.clock.now());
        self.progress.upsert_topic(user_id, &row).await?;
        self.statistics.recompute(user_id).await?;
        tracing::info!(user_id = %user_id, topic = %key, completed = !was_complete, "topic toggled");
        Ok(row)
    }

    /// Stored progress for the user, optionally limited to one exam.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if repository access fails.
    pub async fn progress(
        &self,
        user_id: &UserId,
        exam: Option<&str>,
    ) -> Result<ProgressTree, ProgressServiceError> {
        Ok(self.progress.get_progress(user_id, exam).await?)
    }

    async fn save_and_log(&self, batch: &UpdateBatch) -> Result<ApplyOutcome, ProgressServiceError> {
        let outcome = self.apply(batch).await?;
        if let Some(exam) = batch.exam.as_deref() {
            let entry = ActivityEntry::progress_update(batch.user_id.clone(), exam, self.clock.now());
            self.activity.append_activity(&entry).await?;
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use storage::repository::InMemoryRepository;
    use tracker_core::Catalog;
    use tracker_core::time::{fixed_clock, fixed_now};

    fn service(repo: &InMemoryRepository) -> ProgressService {
        let statistics = Arc::new(StatisticsAggregator::new(
            fixed_clock(),
            Arc::new(Catalog::builtin().clone()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        ));
        ProgressService::new(
            fixed_clock(),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            statistics,
        )
    }

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    fn optics() -> TopicKey {
        TopicKey::new("JEE", "Physics", "Wave Optics").unwrap()
    }

    #[tokio::test]
    async fn merge_patch_keeps_absent_categories() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        repo.upsert_topic(
            &user(),
            &TopicProgress::record(optics(), TopicStatus::new(true, false, true), fixed_now()),
        )
        .await
        .unwrap();

        let outcome = svc
            .merge_patch("u1", "JEE", &json!({"Physics": {"Wave Optics": {"practice": true}}}))
            .await
            .unwrap();
        assert_eq!(outcome.applied, 1);
        assert_eq!(outcome.summary.completed_topics, 1);

        let row = repo.get_topic(&user(), &optics()).await.unwrap().unwrap();
        assert!(row.is_complete());
    }

    #[tokio::test]
    async fn toggle_flips_completion() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);

        let first = svc.toggle(&user(), &optics()).await.unwrap();
        assert!(first.is_complete());
        assert_eq!(first.completed_at(), Some(fixed_now()));

        let second = svc.toggle(&user(), &optics()).await.unwrap();
        assert_eq!(second.status(), TopicStatus::default());
        assert_eq!(second.completed_at(), None);
    }

    #[tokio::test]
    async fn partial_topic_toggles_to_complete() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        repo.upsert_topic(
            &user(),
            &TopicProgress::record(optics(), TopicStatus::new(true, false, false), fixed_now()),
        )
        .await
        .unwrap();
        assert!(svc.toggle(&user(), &optics()).await.unwrap().is_complete());
    }

    #[tokio::test]
    async fn saves_log_progress_activity() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let fields = vec![
            ("exam".to_owned(), "JEE".to_owned()),
            ("user_id".to_owned(), "u1".to_owned()),
            ("Physics__Wave Optics__Theory".to_owned(), "true".to_owned()),
        ];
        svc.save_form(&fields).await.unwrap();

        let feed = repo.recent_activity(&user(), 50).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].activity_type, "progress_update");
        assert_eq!(feed[0].activity_data["description"], "Updated progress in JEE");
    }

    #[tokio::test]
    async fn merge_patch_does_not_log_activity() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        svc.merge_patch("u1", "JEE", &json!({"Physics": {"Wave Optics": {"theory": true}}}))
            .await
            .unwrap();
        assert!(repo.recent_activity(&user(), 50).await.unwrap().is_empty());
    }
}
