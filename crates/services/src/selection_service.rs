use std::sync::Arc;

use storage::repository::{ProgressRepository, SelectionRepository};
use tracker_core::model::{UserId, UserSelection};
use tracker_core::{Catalog, Clock};

use crate::error::SelectionError;
use crate::statistics::StatisticsAggregator;

/// Result of selecting exams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOutcome {
    pub selection: UserSelection,
    pub redirect_url: String,
    /// Rows newly created by seeding; existing progress is left alone.
    pub seeded: u32,
}

/// Tracker page for an exam.
#[must_use]
pub fn tracker_url(exam: &str) -> String {
    format!("/tracker/{exam}")
}

/// Stores exam choices and prepares progress rows for them.
#[derive(Clone)]
pub struct SelectionService {
    clock: Clock,
    catalog: Arc<Catalog>,
    selections: Arc<dyn SelectionRepository>,
    progress: Arc<dyn ProgressRepository>,
    statistics: Arc<StatisticsAggregator>,
}

impl SelectionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: Arc<Catalog>,
        selections: Arc<dyn SelectionRepository>,
        progress: Arc<dyn ProgressRepository>,
        statistics: Arc<StatisticsAggregator>,
    ) -> Self {
        Self {
            clock,
            catalog,
            selections,
            progress,
            statistics,
        }
    }

    /// Replace the user's selected exams and seed a zeroed row for every
    /// syllabus topic of each exam that has no row yet.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::Selection` if no exam remains after trimming.
    /// Returns `SelectionError::UnknownExam` if any exam is not in the catalog.
    /// Returns `SelectionError::Storage` if persistence fails.
    pub async fn select<I, S>(
        &self,
        user_id: UserId,
        exams: I,
    ) -> Result<SelectionOutcome, SelectionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let selection = UserSelection::new(user_id, exams, self.clock.now())?;
        let mut syllabi = Vec::with_capacity(selection.selected_exams().len());
        for exam in selection.selected_exams() {
            let syllabus = self
                .catalog
                .exam(exam)
                .ok_or_else(|| SelectionError::UnknownExam(exam.clone()))?;
            syllabi.push(syllabus);
        }

        self.selections.save_selection(&selection).await?;

        let user_id = selection.user_id();
        let mut seeded = 0_u32;
        for syllabus in syllabi {
            for key in syllabus.topic_keys()? {
                if self.progress.seed_topic(user_id, &key).await? {
                    seeded += 1;
                }
            }
        }
        self.statistics.recompute(user_id).await?;

        tracing::info!(
            user_id = %user_id,
            exams = ?selection.selected_exams(),
            seeded,
            "exam selection saved"
        );
        let redirect_url = tracker_url(selection.selected_exam());
        Ok(SelectionOutcome {
            selection,
            redirect_url,
            seeded,
        })
    }

    /// The user's current selection, if any.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::Storage` if repository access fails.
    pub async fn current(&self, user_id: &UserId) -> Result<Option<UserSelection>, SelectionError> {
        Ok(self.selections.get_selection(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;
    use tracker_core::time::fixed_clock;

    fn service(repo: &InMemoryRepository) -> SelectionService {
        let catalog = Arc::new(Catalog::builtin().clone());
        let statistics = Arc::new(StatisticsAggregator::new(
            fixed_clock(),
            Arc::clone(&catalog),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        ));
        SelectionService::new(
            fixed_clock(),
            catalog,
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            statistics,
        )
    }

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    #[tokio::test]
    async fn unknown_exam_is_rejected_before_saving() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let err = svc.select(user(), ["JEE", "GATE"]).await.unwrap_err();
        assert!(matches!(err, SelectionError::UnknownExam(exam) if exam == "GATE"));
        assert!(svc.current(&user()).await.unwrap().is_none());
        assert!(repo.get_progress(&user(), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_selection_is_validation_error() {
        let repo = InMemoryRepository::new();
        let err = service(&repo).select(user(), [" "]).await.unwrap_err();
        assert!(matches!(err, SelectionError::Selection(_)));
    }

    #[tokio::test]
    async fn reselecting_seeds_nothing_new() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let first = svc.select(user(), ["UGEE"]).await.unwrap();
        assert_eq!(first.seeded, 50);
        assert_eq!(first.redirect_url, "/tracker/UGEE");

        let second = svc.select(user(), ["UGEE", "UGEE"]).await.unwrap();
        assert_eq!(second.seeded, 0);
        assert_eq!(second.selection.selected_exams(), ["UGEE".to_string()]);
    }
}
