use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use services::tracker_url;
use tracker_core::model::UserId;

use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::state::AppState;

/// Either a single `exam` or an ordered `selected_exams` list; the list wins
/// when both are sent.
#[derive(Debug, Deserialize)]
pub struct SelectExamRequest {
    pub user_id: String,
    #[serde(default)]
    pub exam: Option<String>,
    #[serde(default)]
    pub selected_exams: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct SelectExamResponse {
    pub success: bool,
    pub message: String,
    pub redirect_url: String,
    pub selected_exams: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserExamRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct UserExamResponse {
    pub success: bool,
    pub has_selected_exam: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_exam: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_exams: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

/// POST /select-exam
///
/// Records the choice and seeds zeroed rows for every syllabus topic the
/// user has not touched yet.
pub async fn select_exam(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SelectExamRequest>,
) -> AppResult<Json<SelectExamResponse>> {
    let user_id = UserId::new(request.user_id)?;
    let exams = match (request.selected_exams, request.exam) {
        (Some(list), _) if !list.is_empty() => list,
        (_, Some(exam)) => vec![exam],
        _ => return Err(AppError::BadRequest("missing exam".into())),
    };

    let outcome = state.services.selection().select(user_id, exams).await?;
    let primary = outcome.selection.selected_exam().to_owned();
    Ok(Json(SelectExamResponse {
        success: true,
        message: format!("Exam {primary} selected successfully!"),
        redirect_url: outcome.redirect_url,
        selected_exams: outcome.selection.selected_exams().to_vec(),
    }))
}

/// POST /get-user-exam
pub async fn get_user_exam(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UserExamRequest>,
) -> AppResult<Json<UserExamResponse>> {
    let user_id = UserId::new(request.user_id)?;
    let response = match state.services.selection().current(&user_id).await? {
        Some(selection) => UserExamResponse {
            success: true,
            has_selected_exam: true,
            selected_exam: Some(selection.selected_exam().to_owned()),
            selected_exams: Some(selection.selected_exams().to_vec()),
            redirect_url: Some(tracker_url(selection.selected_exam())),
        },
        None => UserExamResponse {
            success: true,
            has_selected_exam: false,
            selected_exam: None,
            selected_exams: None,
            redirect_url: None,
        },
    };
    Ok(Json(response))
}
