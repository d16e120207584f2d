use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

const SCHEMA_V1: &[&str] = &[
    r"
        CREATE TABLE IF NOT EXISTS users (
            user_id TEXT PRIMARY KEY,
            selected_exam TEXT NOT NULL,
            selected_exams TEXT NOT NULL,
            selected_at TEXT NOT NULL
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS user_progress (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            exam TEXT NOT NULL,
            subject TEXT NOT NULL,
            topic TEXT NOT NULL,
            theory INTEGER NOT NULL DEFAULT 0 CHECK (theory IN (0, 1)),
            practice INTEGER NOT NULL DEFAULT 0 CHECK (practice IN (0, 1)),
            revision INTEGER NOT NULL DEFAULT 0 CHECK (revision IN (0, 1)),
            completed_at TEXT,
            UNIQUE (user_id, exam, subject, topic)
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS study_sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            exam TEXT NOT NULL,
            subject TEXT,
            topic TEXT,
            session_type TEXT NOT NULL,
            started_at TEXT NOT NULL,
            ended_at TEXT,
            duration_minutes INTEGER NOT NULL DEFAULT 0 CHECK (duration_minutes >= 0),
            notes TEXT
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS user_statistics (
            user_id TEXT PRIMARY KEY,
            total_study_time INTEGER NOT NULL DEFAULT 0 CHECK (total_study_time >= 0),
            study_streak INTEGER NOT NULL DEFAULT 0 CHECK (study_streak >= 0),
            last_study_date TEXT,
            total_topics_completed INTEGER NOT NULL DEFAULT 0,
            total_exams_started INTEGER NOT NULL DEFAULT 0,
            achievements TEXT NOT NULL DEFAULT '[]',
            weekly_goals TEXT NOT NULL DEFAULT '{}'
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS user_settings (
            user_id TEXT PRIMARY KEY,
            study_reminders INTEGER NOT NULL DEFAULT 1,
            dark_mode INTEGER NOT NULL DEFAULT 0,
            privacy_mode INTEGER NOT NULL DEFAULT 0,
            notification_preferences TEXT NOT NULL DEFAULT '{}',
            theme_preferences TEXT NOT NULL DEFAULT '{}',
            study_schedule TEXT NOT NULL DEFAULT '{}'
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS user_activity (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            activity_type TEXT NOT NULL,
            activity_data TEXT NOT NULL DEFAULT '{}',
            exam TEXT,
            subject TEXT,
            topic TEXT,
            session_duration INTEGER NOT NULL DEFAULT 0 CHECK (session_duration >= 0),
            created_at TEXT NOT NULL
        );
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_user_progress_user_exam
            ON user_progress (user_id, exam);
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_study_sessions_user_started
            ON study_sessions (user_id, started_at);
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_user_activity_user_created
            ON user_activity (user_id, created_at);
    ",
];

/// Runs the schema migrations that have not been applied yet.
///
/// Version 1 creates users, progress, sessions, statistics, settings and activity tables.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        for statement in SCHEMA_V1 {
            sqlx::query(statement).execute(&mut *tx).await?;
        }

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(version = 1, "applied schema migration");
    }

    Ok(())
}
