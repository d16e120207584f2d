use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::Row;
use tracker_core::model::{ProgressSummary, UserId, UserStatistics};

use super::SqliteRepository;
use super::mapping::{db, i64_to_u64, json_from_text, ser, u32_from_i64};
use crate::repository::{StatisticsRepository, StorageError};

#[async_trait]
impl StatisticsRepository for SqliteRepository {
    async fn get_statistics(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserStatistics>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT total_study_time, study_streak, last_study_date,
                   total_topics_completed, total_exams_started, achievements, weekly_goals
            FROM user_statistics
            WHERE user_id = ?1
            ",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let achievements: String = row.try_get("achievements").map_err(ser)?;
        let achievements = match json_from_text("achievements", &achievements)? {
            Value::Array(items) => items,
            other => {
                return Err(StorageError::Serialization(format!(
                    "achievements is not a list: {other}"
                )));
            }
        };
        let weekly_goals: String = row.try_get("weekly_goals").map_err(ser)?;
        let weekly_goals = match json_from_text("weekly_goals", &weekly_goals)? {
            Value::Object(map) => map,
            other => {
                return Err(StorageError::Serialization(format!(
                    "weekly_goals is not an object: {other}"
                )));
            }
        };

        Ok(Some(UserStatistics {
            user_id: user_id.clone(),
            total_study_time: i64_to_u64(
                "total_study_time",
                row.try_get("total_study_time").map_err(ser)?,
            )?,
            study_streak: u32_from_i64("study_streak", row.try_get("study_streak").map_err(ser)?)?,
            last_study_date: row.try_get("last_study_date").map_err(ser)?,
            total_topics_completed: u32_from_i64(
                "total_topics_completed",
                row.try_get("total_topics_completed").map_err(ser)?,
            )?,
            total_exams_started: u32_from_i64(
                "total_exams_started",
                row.try_get("total_exams_started").map_err(ser)?,
            )?,
            achievements,
            weekly_goals,
        }))
    }

    async fn add_study_time(
        &self,
        user_id: &UserId,
        minutes: u32,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO user_statistics (user_id, total_study_time, last_study_date)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id) DO UPDATE SET
                total_study_time = total_study_time + excluded.total_study_time,
                last_study_date = excluded.last_study_date
            ",
        )
        .bind(user_id.as_str())
        .bind(i64::from(minutes))
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(())
    }

    async fn record_progress_counts(
        &self,
        user_id: &UserId,
        summary: &ProgressSummary,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO user_statistics (user_id, total_topics_completed, total_exams_started)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id) DO UPDATE SET
                total_topics_completed = excluded.total_topics_completed,
                total_exams_started = excluded.total_exams_started
            ",
        )
        .bind(user_id.as_str())
        .bind(i64::from(summary.completed_topics))
        .bind(i64::from(summary.total_exams))
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(())
    }
}
