use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracker_core::model::{NewSession, SessionId, StudySession, UserId};

use super::SqliteRepository;
use super::mapping::{db, i64_to_u64, map_session_row, session_id_to_i64, u32_from_i64};
use crate::repository::{SessionRepository, StorageError};

#[async_trait]
impl SessionRepository for SqliteRepository {
    async fn insert_session(&self, session: &NewSession) -> Result<SessionId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO study_sessions (user_id, exam, subject, topic, session_type, started_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(session.user_id.as_str())
        .bind(&session.exam)
        .bind(session.subject.as_deref())
        .bind(session.topic.as_deref())
        .bind(session.session_type.as_str())
        .bind(session.started_at)
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(SessionId::new(i64_to_u64("id", res.last_insert_rowid())?))
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<StudySession>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, exam, subject, topic, session_type,
                   started_at, ended_at, duration_minutes, notes
            FROM study_sessions
            WHERE id = ?1
            ",
        )
        .bind(session_id_to_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?;

        row.as_ref().map(map_session_row).transpose()
    }

    async fn finish_session(&self, session: &StudySession) -> Result<bool, StorageError> {
        let res = sqlx::query(
            r"
            UPDATE study_sessions
            SET ended_at = ?2, duration_minutes = ?3, notes = ?4
            WHERE id = ?1 AND ended_at IS NULL
            ",
        )
        .bind(session_id_to_i64(session.id())?)
        .bind(session.ended_at())
        .bind(i64::from(session.duration_minutes()))
        .bind(session.notes())
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(res.rows_affected() > 0)
    }

    async fn count_sessions_since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<u32, StorageError> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM study_sessions
            WHERE user_id = ?1 AND started_at >= ?2
            ",
        )
        .bind(user_id.as_str())
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(db)?;

        u32_from_i64("session count", count)
    }
}
