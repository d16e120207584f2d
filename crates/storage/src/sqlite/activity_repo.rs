use async_trait::async_trait;
use tracker_core::model::{ActivityEntry, UserId};

use super::SqliteRepository;
use super::mapping::{db, map_activity_row, ser};
use crate::repository::{ActivityRepository, StorageError};

#[async_trait]
impl ActivityRepository for SqliteRepository {
    async fn append_activity(&self, entry: &ActivityEntry) -> Result<i64, StorageError> {
        let data = serde_json::to_string(&entry.activity_data).map_err(ser)?;

        let res = sqlx::query(
            r"
            INSERT INTO user_activity (
                user_id, activity_type, activity_data, exam, subject, topic,
                session_duration, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(entry.user_id.as_str())
        .bind(&entry.activity_type)
        .bind(data)
        .bind(entry.exam.as_deref())
        .bind(entry.subject.as_deref())
        .bind(entry.topic.as_deref())
        .bind(i64::from(entry.session_duration))
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(res.last_insert_rowid())
    }

    async fn recent_activity(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<ActivityEntry>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, activity_type, activity_data, exam, subject, topic,
                   session_duration, created_at
            FROM user_activity
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            ",
        )
        .bind(user_id.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

        rows.iter().map(map_activity_row).collect()
    }
}
