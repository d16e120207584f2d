use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Form, FromRequest, Path, Request, State};
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracker_core::model::{ExamStats, TopicKey, TopicProgressView, UserId};

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiQuery, UserQuery};
use crate::state::AppState;

type ExamView = BTreeMap<String, BTreeMap<String, TopicProgressView>>;

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub user_id: String,
    pub exam: String,
    pub subject: String,
    pub topic: String,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

/// GET /api/progress/{exam}?user_id=
pub async fn get_progress(
    State(state): State<AppState>,
    Path(exam): Path<String>,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> AppResult<Json<ExamView>> {
    let user_id = UserId::new(query.user_id)?;
    let tree = state
        .services
        .progress()
        .progress(&user_id, Some(&exam))
        .await?;
    Ok(Json(tree.exam_view(&exam)))
}

/// POST /api/progress/{exam}?user_id=
///
/// Merges only the categories present in the body into stored rows.
pub async fn patch_progress(
    State(state): State<AppState>,
    Path(exam): Path<String>,
    ApiQuery(query): ApiQuery<UserQuery>,
    ApiJson(body): ApiJson<Value>,
) -> AppResult<Json<Value>> {
    let outcome = state
        .services
        .progress()
        .merge_patch(&query.user_id, &exam, &body)
        .await?;
    Ok(Json(json!({
        "success": true,
        "applied": outcome.applied,
        "skipped": outcome.skipped,
    })))
}

/// POST /api/save_progress
///
/// A JSON body is read as the nested shape and answered with the refreshed
/// statistics. Anything else is read as a form and answered with a redirect
/// to the confirmation page.
pub async fn save_progress(State(state): State<AppState>, request: Request) -> AppResult<Response> {
    if is_json(&request) {
        let Json(body) = Json::<Value>::from_request(request, &state).await?;
        let outcome = state.services.progress().save_nested(&body).await?;
        let statistics = state.services.statistics().report(&outcome.user_id).await?;
        return Ok(Json(json!({
            "success": true,
            "message": "Progress saved successfully",
            "statistics": statistics,
        }))
        .into_response());
    }

    let Form(fields) = Form::<Vec<(String, String)>>::from_request(request, &state).await?;
    let outcome = state.services.progress().save_form(&fields).await?;
    let location = confirmation_location(outcome.exam.as_deref().unwrap_or_default());
    Ok((StatusCode::SEE_OTHER, [(LOCATION, location)]).into_response())
}

/// Confirmation page URL with the exam form-encoded into the query.
fn confirmation_location(exam: &str) -> HeaderValue {
    let encoded: String = url::form_urlencoded::byte_serialize(exam.as_bytes()).collect();
    // form encoding only emits visible ASCII
    HeaderValue::try_from(format!("/save-confirmation?exam={encoded}"))
        .unwrap_or_else(|_| HeaderValue::from_static("/save-confirmation"))
}

/// POST /api/toggle-topic
pub async fn toggle_topic(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ToggleRequest>,
) -> AppResult<Json<ToggleResponse>> {
    let user_id = UserId::new(request.user_id)?;
    let key = TopicKey::new(&request.exam, &request.subject, &request.topic)?;
    let row = state.services.progress().toggle(&user_id, &key).await?;
    Ok(Json(ToggleResponse {
        success: true,
        completed: row.is_complete(),
        completed_at: row.completed_at(),
    }))
}

/// GET /api/stats/{exam}?user_id=
pub async fn exam_stats(
    State(state): State<AppState>,
    Path(exam): Path<String>,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> AppResult<Json<ExamStats>> {
    let user_id = UserId::new(query.user_id)?;
    let stats = state.services.statistics().exam_stats(&user_id, &exam).await?;
    Ok(Json(stats))
}

fn is_json(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().starts_with("application/json"))
}
