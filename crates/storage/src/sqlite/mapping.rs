use serde_json::Value;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use tracker_core::model::{
    ActivityEntry, SessionId, SessionType, StudySession, TopicKey, TopicProgress, TopicStatus,
    UserId, UserSettings,
};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Classify a driver error; lock waits and pool exhaustion are timeouts.
pub(crate) fn db<E: Into<sqlx::Error>>(e: E) -> StorageError {
    match e.into() {
        sqlx::Error::PoolTimedOut => StorageError::Timeout,
        sqlx::Error::Database(err) if err.is_unique_violation() => StorageError::Conflict,
        sqlx::Error::Database(err) if err.message().contains("database is locked") => {
            StorageError::Timeout
        }
        other => StorageError::Connection(other.to_string()),
    }
}

pub(crate) fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn session_id_to_i64(id: SessionId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("session id overflow".into()))
}

pub(crate) fn user_id_from_row(row: &SqliteRow) -> Result<UserId, StorageError> {
    UserId::new(row.try_get::<String, _>("user_id").map_err(ser)?).map_err(ser)
}

pub(crate) fn json_from_text(field: &'static str, raw: &str) -> Result<Value, StorageError> {
    serde_json::from_str(raw)
        .map_err(|e| StorageError::Serialization(format!("invalid {field} JSON: {e}")))
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> Result<TopicProgress, StorageError> {
    let key = TopicKey::new(
        row.try_get::<String, _>("exam").map_err(ser)?,
        row.try_get::<String, _>("subject").map_err(ser)?,
        row.try_get::<String, _>("topic").map_err(ser)?,
    )
    .map_err(ser)?;
    let status = TopicStatus::new(
        row.try_get("theory").map_err(ser)?,
        row.try_get("practice").map_err(ser)?,
        row.try_get("revision").map_err(ser)?,
    );
    Ok(TopicProgress::from_persisted(
        key,
        status,
        row.try_get("completed_at").map_err(ser)?,
    ))
}

pub(crate) fn map_session_row(row: &SqliteRow) -> Result<StudySession, StorageError> {
    let id = SessionId::new(i64_to_u64("id", row.try_get("id").map_err(ser)?)?);
    let session_type: SessionType = row
        .try_get::<String, _>("session_type")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let duration = u32_from_i64(
        "duration_minutes",
        row.try_get("duration_minutes").map_err(ser)?,
    )?;

    StudySession::from_persisted(
        id,
        user_id_from_row(row)?,
        row.try_get("exam").map_err(ser)?,
        row.try_get("subject").map_err(ser)?,
        row.try_get("topic").map_err(ser)?,
        session_type,
        row.try_get("started_at").map_err(ser)?,
        row.try_get("ended_at").map_err(ser)?,
        duration,
        row.try_get("notes").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_settings_row(row: &SqliteRow) -> Result<UserSettings, StorageError> {
    let notification: String = row.try_get("notification_preferences").map_err(ser)?;
    let theme: String = row.try_get("theme_preferences").map_err(ser)?;
    let schedule: String = row.try_get("study_schedule").map_err(ser)?;

    UserSettings::from_persisted(
        row.try_get("study_reminders").map_err(ser)?,
        row.try_get("dark_mode").map_err(ser)?,
        row.try_get("privacy_mode").map_err(ser)?,
        json_from_text("notification_preferences", &notification)?,
        json_from_text("theme_preferences", &theme)?,
        json_from_text("study_schedule", &schedule)?,
    )
    .map_err(ser)
}

pub(crate) fn map_activity_row(row: &SqliteRow) -> Result<ActivityEntry, StorageError> {
    let data: String = row.try_get("activity_data").map_err(ser)?;
    let duration = u32_from_i64(
        "session_duration",
        row.try_get("session_duration").map_err(ser)?,
    )?;
    Ok(ActivityEntry {
        id: Some(row.try_get("id").map_err(ser)?),
        user_id: user_id_from_row(row)?,
        activity_type: row.try_get("activity_type").map_err(ser)?,
        activity_data: json_from_text("activity_data", &data)?,
        exam: row.try_get("exam").map_err(ser)?,
        subject: row.try_get("subject").map_err(ser)?,
        topic: row.try_get("topic").map_err(ser)?,
        session_duration: duration,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}
