#![forbid(unsafe_code)]

pub mod activity_service;
pub mod app_services;
pub mod error;
pub mod gateway;
pub mod progress_service;
pub mod selection_service;
pub mod session_log;
pub mod settings_service;
pub mod statistics;
pub mod sync_service;

pub use tracker_core::{Catalog, Clock};

pub use activity_service::{ActivityService, NewActivity};
pub use app_services::AppServices;
pub use error::{
    ActivityServiceError, AppServicesError, PayloadError, ProgressServiceError, SelectionError,
    ServiceErrorKind, SessionLogError, SettingsServiceError, StatisticsError, SyncError,
};
pub use gateway::{StatusChange, TopicUpdate, UpdateBatch};
pub use progress_service::{ApplyOutcome, ProgressService};
pub use selection_service::{SelectionOutcome, SelectionService, tracker_url};
pub use session_log::{EndedSession, SessionLog, StartSession};
pub use settings_service::SettingsService;
pub use statistics::{StatisticsAggregator, StatisticsReport};
pub use sync_service::{SyncOutcome, SyncService};
