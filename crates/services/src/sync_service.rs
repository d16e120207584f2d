use std::sync::Arc;

use serde_json::Value;
use tracker_core::model::{UserSettings, UserSettingsDraft};

use crate::error::{SettingsServiceError, SyncError};
use crate::gateway;
use crate::progress_service::ProgressService;
use crate::settings_service::SettingsService;
use crate::statistics::{StatisticsAggregator, StatisticsReport};

/// Result of a bulk sync.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    pub applied: u32,
    pub skipped: u32,
    pub statistics: StatisticsReport,
    pub settings: UserSettings,
}

/// Applies a multi-exam progress sync and optional settings in one call.
#[derive(Clone)]
pub struct SyncService {
    progress: Arc<ProgressService>,
    settings: Arc<SettingsService>,
    statistics: Arc<StatisticsAggregator>,
}

impl SyncService {
    #[must_use]
    pub fn new(
        progress: Arc<ProgressService>,
        settings: Arc<SettingsService>,
        statistics: Arc<StatisticsAggregator>,
    ) -> Self {
        Self {
            progress,
            settings,
            statistics,
        }
    }

    /// Sync `{user_id, progress: {exam: ..}, settings?}`.
    ///
    /// Settings are parsed and validated before any progress is written, so a
    /// bad settings object rejects the whole request.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` for malformed payloads and storage failures.
    pub async fn sync(&self, body: &Value) -> Result<SyncOutcome, SyncError> {
        let batch = gateway::parse_bulk(body).map_err(crate::error::ProgressServiceError::from)?;
        let settings = match body.get("settings") {
            None | Some(Value::Null) => None,
            Some(raw) => {
                let draft = serde_json::from_value::<UserSettingsDraft>(raw.clone())?;
                Some(draft.validate().map_err(SettingsServiceError::from)?)
            }
        };

        let outcome = self.progress.apply(&batch).await?;
        let settings = match settings {
            Some(settings) => self.settings.store(&batch.user_id, settings).await?,
            None => self.settings.load(&batch.user_id).await?,
        };
        let statistics = self.statistics.report(&batch.user_id).await?;

        Ok(SyncOutcome {
            applied: outcome.applied,
            skipped: outcome.skipped,
            statistics,
            settings,
        })
    }
}
