use std::str::FromStr;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use services::{NewActivity, SessionLogError, StartSession};
use tracker_core::model::{SessionId, SessionType, UserId, UserSettingsDraft};

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiQuery, UserQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveSettingsRequest {
    pub user_id: String,
    #[serde(flatten)]
    pub settings: UserSettingsDraft,
}

#[derive(Debug, Deserialize)]
pub struct LogActivityRequest {
    pub user_id: String,
    pub activity_type: String,
    #[serde(default = "empty_object")]
    pub activity_data: Value,
    #[serde(default)]
    pub exam: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub session_duration: u32,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum StudySessionRequest {
    Start {
        user_id: String,
        exam: String,
        #[serde(default)]
        subject: Option<String>,
        #[serde(default)]
        topic: Option<String>,
        #[serde(default)]
        session_type: Option<String>,
    },
    End {
        session_id: u64,
        #[serde(default)]
        notes: Option<String>,
    },
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// POST /api/user/sync
pub async fn sync(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> AppResult<Json<Value>> {
    let outcome = state.services.sync().sync(&body).await?;
    Ok(Json(json!({
        "success": true,
        "applied": outcome.applied,
        "skipped": outcome.skipped,
        "statistics": outcome.statistics,
        "settings": outcome.settings,
    })))
}

/// GET /api/user/settings?user_id=
pub async fn get_settings(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> AppResult<Json<Value>> {
    let user_id = UserId::new(query.user_id)?;
    let settings = state.services.settings().load(&user_id).await?;
    Ok(Json(json!({"success": true, "settings": settings})))
}

/// POST /api/user/settings
///
/// Replaces every setting; omitted flags reset to `false`.
pub async fn save_settings(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SaveSettingsRequest>,
) -> AppResult<Json<Value>> {
    let user_id = UserId::new(request.user_id)?;
    let settings = state
        .services
        .settings()
        .save(&user_id, request.settings)
        .await?;
    Ok(Json(json!({"success": true, "settings": settings})))
}

/// POST /api/user/activity
pub async fn log_activity(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LogActivityRequest>,
) -> AppResult<Json<Value>> {
    let user_id = UserId::new(request.user_id)?;
    let entry = state
        .services
        .activity()
        .log(NewActivity {
            user_id,
            activity_type: request.activity_type,
            activity_data: request.activity_data,
            exam: request.exam,
            subject: request.subject,
            topic: request.topic,
            session_duration: request.session_duration,
        })
        .await?;
    Ok(Json(json!({"success": true, "activity": entry})))
}

/// GET /api/user/activity?user_id=
pub async fn recent_activity(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> AppResult<Json<Value>> {
    let user_id = UserId::new(query.user_id)?;
    let activities = state.services.activity().recent(&user_id).await?;
    Ok(Json(json!({"success": true, "activities": activities})))
}

/// POST /api/user/study-session
pub async fn study_session(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<StudySessionRequest>,
) -> AppResult<Json<Value>> {
    match request {
        StudySessionRequest::Start {
            user_id,
            exam,
            subject,
            topic,
            session_type,
        } => {
            let session_type = match session_type.as_deref() {
                None => SessionType::default(),
                Some(raw) => SessionType::from_str(raw).map_err(SessionLogError::from)?,
            };
            let id = state
                .services
                .sessions()
                .start(StartSession {
                    user_id: UserId::new(user_id)?,
                    exam,
                    subject,
                    topic,
                    session_type,
                })
                .await?;
            Ok(Json(json!({"success": true, "session_id": id.value()})))
        }
        StudySessionRequest::End { session_id, notes } => {
            let ended = state
                .services
                .sessions()
                .end(SessionId::new(session_id), notes)
                .await?;
            Ok(Json(json!({
                "success": true,
                "session_id": ended.id.value(),
                "duration": ended.duration_minutes,
            })))
        }
    }
}

/// GET /api/user/statistics?user_id=
pub async fn statistics(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> AppResult<Json<Value>> {
    let user_id = UserId::new(query.user_id)?;
    let report = state.services.statistics().report(&user_id).await?;
    Ok(Json(json!({"success": true, "statistics": report})))
}
