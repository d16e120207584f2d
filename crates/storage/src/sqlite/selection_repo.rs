use async_trait::async_trait;
use sqlx::Row;
use tracker_core::model::{UserId, UserSelection};

use super::SqliteRepository;
use super::mapping::{db, ser};
use crate::repository::{SelectionRepository, StorageError};

#[async_trait]
impl SelectionRepository for SqliteRepository {
    async fn save_selection(&self, selection: &UserSelection) -> Result<(), StorageError> {
        let exams = serde_json::to_string(selection.selected_exams()).map_err(ser)?;

        sqlx::query(
            r"
            INSERT INTO users (user_id, selected_exam, selected_exams, selected_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id) DO UPDATE SET
                selected_exam = excluded.selected_exam,
                selected_exams = excluded.selected_exams,
                selected_at = excluded.selected_at
            ",
        )
        .bind(selection.user_id().as_str())
        .bind(selection.selected_exam())
        .bind(exams)
        .bind(selection.selected_at())
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(())
    }

    async fn get_selection(&self, user_id: &UserId) -> Result<Option<UserSelection>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT selected_exams, selected_at
            FROM users
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

        let raw: String = row.try_get("selected_exams").map_err(ser)?;
        let exams: Vec<String> = serde_json::from_str(&raw).map_err(ser)?;
        UserSelection::new(
            user_id.clone(),
            exams,
            row.try_get("selected_at").map_err(ser)?,
        )
        .map(Some)
        .map_err(ser)
    }
}
