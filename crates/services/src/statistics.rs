use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use storage::repository::{ProgressRepository, SessionRepository, StatisticsRepository};
use tracker_core::model::{ExamStats, ProgressSummary, UserId, UserStatistics};
use tracker_core::{Catalog, Clock};

use crate::error::StatisticsError;

/// Window for `recent_sessions` in a report.
const RECENT_SESSION_WINDOW_DAYS: i64 = 7;

/// Cached statistics merged with a fresh progress recompute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsReport {
    pub user_id: UserId,
    /// Minutes.
    pub total_study_time: u64,
    pub study_streak: u32,
    pub last_study_date: Option<DateTime<Utc>>,
    pub total_topics_completed: u32,
    pub total_exams_started: u32,
    pub total_topics: u32,
    pub completion_percentage: f64,
    pub recent_sessions: u32,
    pub achievements: Vec<Value>,
    pub weekly_goals: Map<String, Value>,
}

impl StatisticsReport {
    fn new(stats: UserStatistics, summary: &ProgressSummary, recent_sessions: u32) -> Self {
        Self {
            user_id: stats.user_id,
            total_study_time: stats.total_study_time,
            study_streak: stats.study_streak,
            last_study_date: stats.last_study_date,
            total_topics_completed: summary.completed_topics,
            total_exams_started: summary.total_exams,
            total_topics: summary.total_topics,
            completion_percentage: summary.completion_percentage,
            recent_sessions,
            achievements: stats.achievements,
            weekly_goals: stats.weekly_goals,
        }
    }
}

/// Derives counters from the progress store and session log and keeps the
/// per-user statistics cache in step with them.
#[derive(Clone)]
pub struct StatisticsAggregator {
    clock: Clock,
    catalog: Arc<Catalog>,
    progress: Arc<dyn ProgressRepository>,
    sessions: Arc<dyn SessionRepository>,
    statistics: Arc<dyn StatisticsRepository>,
}

impl StatisticsAggregator {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: Arc<Catalog>,
        progress: Arc<dyn ProgressRepository>,
        sessions: Arc<dyn SessionRepository>,
        statistics: Arc<dyn StatisticsRepository>,
    ) -> Self {
        Self {
            clock,
            catalog,
            progress,
            sessions,
            statistics,
        }
    }

    /// Recount the user's progress across every exam and cache the result.
    ///
    /// A topic counts as completed only when theory, practice and revision
    /// are all done. A user without rows gets an all-zero summary.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::Storage` if reading or caching fails.
    pub async fn recompute(&self, user_id: &UserId) -> Result<ProgressSummary, StatisticsError> {
        let tree = self.progress.get_progress(user_id, None).await?;
        let summary = ProgressSummary::from_tree(&tree);
        self.statistics
            .record_progress_counts(user_id, &summary)
            .await?;
        tracing::debug!(
            user_id = %user_id,
            total_topics = summary.total_topics,
            completed_topics = summary.completed_topics,
            "statistics recomputed"
        );
        Ok(summary)
    }

    /// Add finished study minutes and stamp the last study date.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::Storage` if the cache cannot be updated.
    pub async fn record_session_time(
        &self,
        user_id: &UserId,
        minutes: u32,
    ) -> Result<(), StatisticsError> {
        self.statistics
            .add_study_time(user_id, minutes, self.clock.now())
            .await?;
        Ok(())
    }

    /// Full statistics for the user, recomputing progress counts first.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::Storage` on storage failures.
    pub async fn report(&self, user_id: &UserId) -> Result<StatisticsReport, StatisticsError> {
        let summary = self.recompute(user_id).await?;
        let stats = self
            .statistics
            .get_statistics(user_id)
            .await?
            .unwrap_or_else(|| UserStatistics::empty(user_id.clone()));
        let since = self.clock.now() - Duration::days(RECENT_SESSION_WINDOW_DAYS);
        let recent = self.sessions.count_sessions_since(user_id, since).await?;
        Ok(StatisticsReport::new(stats, &summary, recent))
    }

    /// Completion for one exam, measured against the syllabus.
    ///
    /// Rows for topics the syllabus does not list are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::UnknownExam` if the catalog lacks the exam.
    /// Returns `StatisticsError::Storage` on storage failures.
    pub async fn exam_stats(&self, user_id: &UserId, exam: &str) -> Result<ExamStats, StatisticsError> {
        let syllabus = self
            .catalog
            .exam(exam)
            .ok_or_else(|| StatisticsError::UnknownExam(exam.to_owned()))?;
        let tree = self.progress.get_progress(user_id, Some(exam)).await?;
        let completed = tree
            .rows()
            .filter(|row| row.is_complete())
            .filter(|row| syllabus.contains(row.key().subject(), row.key().topic()))
            .count();
        let completed = u32::try_from(completed).unwrap_or(u32::MAX);
        Ok(ExamStats::new(syllabus.topic_count(), completed))
    }
}
