pub mod health;

use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

/// Build the route tree.
///
/// ```text
/// /api/syllabi                 full catalog (GET)
/// /api/progress/{exam}         one exam's progress (GET), merge patch (POST)
/// /api/save_progress           form or nested JSON save (POST)
/// /api/toggle-topic            flip a topic's completion (POST)
/// /api/stats/{exam}            per-exam completion counts (GET)
///
/// /select-exam                 record the exam choice and seed rows (POST)
/// /get-user-exam               current choice (POST)
///
/// /api/user/sync               multi-exam sync plus settings (POST)
/// /api/user/settings           load (GET), replace (POST)
/// /api/user/activity           recent entries (GET), append (POST)
/// /api/user/study-session      start or end a session (POST)
/// /api/user/statistics         statistics report (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/syllabi", get(handlers::syllabus::list_syllabi))
        .route(
            "/api/progress/{exam}",
            get(handlers::progress::get_progress).post(handlers::progress::patch_progress),
        )
        .route("/api/save_progress", post(handlers::progress::save_progress))
        .route("/api/toggle-topic", post(handlers::progress::toggle_topic))
        .route("/api/stats/{exam}", get(handlers::progress::exam_stats))
        .route("/select-exam", post(handlers::selection::select_exam))
        .route("/get-user-exam", post(handlers::selection::get_user_exam))
        .route("/api/user/sync", post(handlers::user::sync))
        .route(
            "/api/user/settings",
            get(handlers::user::get_settings).post(handlers::user::save_settings),
        )
        .route(
            "/api/user/activity",
            get(handlers::user::recent_activity).post(handlers::user::log_activity),
        )
        .route("/api/user/study-session", post(handlers::user::study_session))
        .route("/api/user/statistics", get(handlers::user::statistics))
}
