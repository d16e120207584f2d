use std::sync::Arc;
use std::time::Duration;

use storage::repository::Storage;
use tracker_core::{Catalog, Clock};

use crate::activity_service::ActivityService;
use crate::error::AppServicesError;
use crate::progress_service::ProgressService;
use crate::selection_service::SelectionService;
use crate::session_log::SessionLog;
use crate::settings_service::SettingsService;
use crate::statistics::StatisticsAggregator;
use crate::sync_service::SyncService;

/// Assembles the tracker services over one storage backend and catalog.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<Catalog>,
    progress: Arc<ProgressService>,
    statistics: Arc<StatisticsAggregator>,
    sessions: Arc<SessionLog>,
    selection: Arc<SelectionService>,
    settings: Arc<SettingsService>,
    activity: Arc<ActivityService>,
    sync: Arc<SyncService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        storage_timeout: Duration,
        clock: Clock,
        catalog: Arc<Catalog>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite_with_timeout(db_url, storage_timeout).await?;
        Ok(Self::from_storage(&storage, clock, catalog))
    }

    /// Build services over in-memory repositories.
    #[must_use]
    pub fn in_memory(clock: Clock, catalog: Arc<Catalog>) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, catalog)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, catalog: Arc<Catalog>) -> Self {
        let statistics = Arc::new(StatisticsAggregator::new(
            clock,
            Arc::clone(&catalog),
            Arc::clone(&storage.progress),
            Arc::clone(&storage.sessions),
            Arc::clone(&storage.statistics),
        ));
        let progress = Arc::new(ProgressService::new(
            clock,
            Arc::clone(&storage.progress),
            Arc::clone(&storage.activity),
            Arc::clone(&statistics),
        ));
        let sessions = Arc::new(SessionLog::new(
            clock,
            Arc::clone(&storage.sessions),
            Arc::clone(&statistics),
        ));
        let selection = Arc::new(SelectionService::new(
            clock,
            Arc::clone(&catalog),
            Arc::clone(&storage.selections),
            Arc::clone(&storage.progress),
            Arc::clone(&statistics),
        ));
        let settings = Arc::new(SettingsService::new(Arc::clone(&storage.settings)));
        let activity = Arc::new(ActivityService::new(clock, Arc::clone(&storage.activity)));
        let sync = Arc::new(SyncService::new(
            Arc::clone(&progress),
            Arc::clone(&settings),
            Arc::clone(&statistics),
        ));

        Self {
            catalog,
            progress,
            statistics,
            sessions,
            selection,
            settings,
            activity,
            sync,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn statistics(&self) -> Arc<StatisticsAggregator> {
        Arc::clone(&self.statistics)
    }

    #[must_use]
    pub fn sessions(&self) -> Arc<SessionLog> {
        Arc::clone(&self.sessions)
    }

    #[must_use]
    pub fn selection(&self) -> Arc<SelectionService> {
        Arc::clone(&self.selection)
    }

    #[must_use]
    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings)
    }

    #[must_use]
    pub fn activity(&self) -> Arc<ActivityService> {
        Arc::clone(&self.activity)
    }

    #[must_use]
    pub fn sync(&self) -> Arc<SyncService> {
        Arc::clone(&self.sync)
    }
}
