use axum::extract::rejection::{FormRejection, JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use services::{
    ActivityServiceError, ProgressServiceError, SelectionError, ServiceErrorKind, SessionLogError,
    SettingsServiceError, StatisticsError, SyncError,
};
use tracker_core::model::{TopicKeyError, UserIdError};

/// Application-level error type for HTTP handlers.
///
/// Wraps the service errors and the body/query extraction rejections.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Progress(#[from] ProgressServiceError),

    #[error(transparent)]
    Statistics(#[from] StatisticsError),

    #[error(transparent)]
    Session(#[from] SessionLogError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Settings(#[from] SettingsServiceError),

    #[error(transparent)]
    Activity(#[from] ActivityServiceError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    UserId(#[from] UserIdError),

    #[error(transparent)]
    Key(#[from] TopicKeyError),

    /// A bad request with a human-readable message.
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error(transparent)]
    Form(#[from] FormRejection),

    #[error(transparent)]
    Query(#[from] QueryRejection),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    #[must_use]
    pub fn kind(&self) -> ServiceErrorKind {
        match self {
            AppError::Progress(err) => err.kind(),
            AppError::Statistics(err) => err.kind(),
            AppError::Session(err) => err.kind(),
            AppError::Selection(err) => err.kind(),
            AppError::Settings(err) => err.kind(),
            AppError::Activity(err) => err.kind(),
            AppError::Sync(err) => err.kind(),
            AppError::UserId(_)
            | AppError::Key(_)
            | AppError::BadRequest(_)
            | AppError::Json(_)
            | AppError::Form(_)
            | AppError::Query(_) => ServiceErrorKind::Validation,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self.kind() {
            ServiceErrorKind::Validation => (
                StatusCode::BAD_REQUEST,
                json!({"success": false, "error": self.to_string(), "code": "VALIDATION_ERROR"}),
            ),
            ServiceErrorKind::NotFound => (
                StatusCode::NOT_FOUND,
                json!({"success": false, "error": self.to_string(), "code": "NOT_FOUND"}),
            ),
            ServiceErrorKind::Storage { retryable } => {
                tracing::error!(error = %self, retryable, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "success": false,
                        "error": "A storage error occurred",
                        "code": "STORAGE_ERROR",
                        "retryable": retryable,
                    }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::StorageError;

    #[test]
    fn unknown_exam_maps_to_not_found() {
        let err = AppError::from(StatisticsError::UnknownExam("GRE".into()));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn storage_timeout_maps_to_server_error() {
        let err = AppError::from(ProgressServiceError::Storage(StorageError::Timeout));
        assert_eq!(err.kind(), ServiceErrorKind::Storage { retryable: true });
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bad_request_maps_to_validation() {
        let err = AppError::BadRequest("missing user_id".into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
