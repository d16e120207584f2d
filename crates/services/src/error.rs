//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use tracker_core::model::{
    ActivityError, SelectionError as SelectionRuleError, SessionError, SettingsError,
    TopicKeyError, UserIdError,
};
use tracker_core::syllabus::CatalogError;

/// Coarse classification used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// The request itself is malformed.
    Validation,
    /// A referenced exam or session does not exist.
    NotFound,
    /// The backing store failed.
    Storage { retryable: bool },
}

impl ServiceErrorKind {
    fn of_storage(err: &StorageError) -> Self {
        match err {
            StorageError::NotFound => ServiceErrorKind::NotFound,
            other => ServiceErrorKind::Storage {
                retryable: other.is_retryable(),
            },
        }
    }
}

/// Errors raised while reading an update payload.
///
/// These reject the whole request; malformed individual leaves are skipped instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PayloadError {
    #[error("missing user id")]
    MissingUserId,
    #[error("missing exam")]
    MissingExam,
    #[error("{0} must be a JSON object")]
    NotAnObject(&'static str),
    #[error(transparent)]
    UserId(#[from] UserIdError),
}

/// Errors emitted by `StatisticsAggregator`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatisticsError {
    #[error("unknown exam: {0}")]
    UnknownExam(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl StatisticsError {
    #[must_use]
    pub fn kind(&self) -> ServiceErrorKind {
        match self {
            StatisticsError::UnknownExam(_) => ServiceErrorKind::NotFound,
            StatisticsError::Storage(err) => ServiceErrorKind::of_storage(err),
        }
    }
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error(transparent)]
    Key(#[from] TopicKeyError),
    #[error(transparent)]
    Statistics(#[from] StatisticsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ProgressServiceError {
    #[must_use]
    pub fn kind(&self) -> ServiceErrorKind {
        match self {
            ProgressServiceError::Payload(_) | ProgressServiceError::Key(_) => {
                ServiceErrorKind::Validation
            }
            ProgressServiceError::Statistics(err) => err.kind(),
            ProgressServiceError::Storage(err) => ServiceErrorKind::of_storage(err),
        }
    }
}

/// Errors emitted by `SessionLog`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionLogError {
    #[error("study session not found or already ended")]
    NotFound,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Statistics(#[from] StatisticsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SessionLogError {
    #[must_use]
    pub fn kind(&self) -> ServiceErrorKind {
        match self {
            SessionLogError::NotFound | SessionLogError::Session(SessionError::AlreadyEnded) => {
                ServiceErrorKind::NotFound
            }
            SessionLogError::Session(_) => ServiceErrorKind::Validation,
            SessionLogError::Statistics(err) => err.kind(),
            SessionLogError::Storage(err) => ServiceErrorKind::of_storage(err),
        }
    }
}

/// Errors emitted by `SelectionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SelectionError {
    #[error("unknown exam: {0}")]
    UnknownExam(String),
    #[error(transparent)]
    Selection(#[from] SelectionRuleError),
    #[error(transparent)]
    Key(#[from] TopicKeyError),
    #[error(transparent)]
    Statistics(#[from] StatisticsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SelectionError {
    #[must_use]
    pub fn kind(&self) -> ServiceErrorKind {
        match self {
            SelectionError::UnknownExam(_) => ServiceErrorKind::NotFound,
            SelectionError::Selection(_) | SelectionError::Key(_) => ServiceErrorKind::Validation,
            SelectionError::Statistics(err) => err.kind(),
            SelectionError::Storage(err) => ServiceErrorKind::of_storage(err),
        }
    }
}

/// Errors emitted by `SettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsServiceError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SettingsServiceError {
    #[must_use]
    pub fn kind(&self) -> ServiceErrorKind {
        match self {
            SettingsServiceError::Settings(_) => ServiceErrorKind::Validation,
            SettingsServiceError::Storage(err) => ServiceErrorKind::of_storage(err),
        }
    }
}

/// Errors emitted by `ActivityService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ActivityServiceError {
    #[error(transparent)]
    Activity(#[from] ActivityError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ActivityServiceError {
    #[must_use]
    pub fn kind(&self) -> ServiceErrorKind {
        match self {
            ActivityServiceError::Activity(_) => ServiceErrorKind::Validation,
            ActivityServiceError::Storage(err) => ServiceErrorKind::of_storage(err),
        }
    }
}

/// Errors emitted by `SyncService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyncError {
    #[error("invalid settings: {0}")]
    InvalidSettings(#[from] serde_json::Error),
    #[error(transparent)]
    Progress(#[from] ProgressServiceError),
    #[error(transparent)]
    Settings(#[from] SettingsServiceError),
    #[error(transparent)]
    Statistics(#[from] StatisticsError),
}

impl SyncError {
    #[must_use]
    pub fn kind(&self) -> ServiceErrorKind {
        match self {
            SyncError::InvalidSettings(_) => ServiceErrorKind::Validation,
            SyncError::Progress(err) => err.kind(),
            SyncError::Settings(err) => err.kind(),
            SyncError::Statistics(err) => err.kind(),
        }
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
