use async_trait::async_trait;
use tracker_core::model::{ProgressTree, TopicKey, TopicProgress, UserId};

use super::SqliteRepository;
use super::mapping::{db, map_progress_row};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn upsert_topic(
        &self,
        user_id: &UserId,
        row: &TopicProgress,
    ) -> Result<(), StorageError> {
        let key = row.key();
        let status = row.status();

        sqlx::query(
            r"
            INSERT INTO user_progress (user_id, exam, subject, topic, theory, practice, revision, completed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(user_id, exam, subject, topic) DO UPDATE SET
                theory = excluded.theory,
                practice = excluded.practice,
                revision = excluded.revision,
                completed_at = excluded.completed_at
            ",
        )
        .bind(user_id.as_str())
        .bind(key.exam())
        .bind(key.subject())
        .bind(key.topic())
        .bind(status.theory)
        .bind(status.practice)
        .bind(status.revision)
        .bind(row.completed_at())
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(())
    }

    async fn seed_topic(&self, user_id: &UserId, key: &TopicKey) -> Result<bool, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO user_progress (user_id, exam, subject, topic, theory, practice, revision, completed_at)
            VALUES (?1, ?2, ?3, ?4, 0, 0, 0, NULL)
            ON CONFLICT(user_id, exam, subject, topic) DO NOTHING
            ",
        )
        .bind(user_id.as_str())
        .bind(key.exam())
        .bind(key.subject())
        .bind(key.topic())
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(res.rows_affected() > 0)
    }

    async fn get_topic(
        &self,
        user_id: &UserId,
        key: &TopicKey,
    ) -> Result<Option<TopicProgress>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT exam, subject, topic, theory, practice, revision, completed_at
            FROM user_progress
            WHERE user_id = ?1 AND exam = ?2 AND subject = ?3 AND topic = ?4
            ",
        )
        .bind(user_id.as_str())
        .bind(key.exam())
        .bind(key.subject())
        .bind(key.topic())
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?;

        row.as_ref().map(map_progress_row).transpose()
    }

    async fn get_progress(
        &self,
        user_id: &UserId,
        exam: Option<&str>,
    ) -> Result<ProgressTree, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT exam, subject, topic, theory, practice, revision, completed_at
            FROM user_progress
            WHERE user_id = ?1 AND (?2 IS NULL OR exam = ?2)
            ORDER BY exam, subject, topic
            ",
        )
        .bind(user_id.as_str())
        .bind(exam)
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

        rows.iter().map(map_progress_row).collect()
    }
}
