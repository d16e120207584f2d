use std::sync::Arc;

use storage::repository::SessionRepository;
use tracker_core::Clock;
use tracker_core::model::{NewSession, SessionId, SessionType, UserId};

use crate::error::SessionLogError;
use crate::statistics::StatisticsAggregator;

/// What a caller supplies to open a study session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartSession {
    pub user_id: UserId,
    pub exam: String,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub session_type: SessionType,
}

/// A session closed by [`SessionLog::end`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndedSession {
    pub id: SessionId,
    pub duration_minutes: u32,
}

/// Records study sessions and feeds their durations into statistics.
#[derive(Clone)]
pub struct SessionLog {
    clock: Clock,
    sessions: Arc<dyn SessionRepository>,
    statistics: Arc<StatisticsAggregator>,
}

impl SessionLog {
    #[must_use]
    pub fn new(
        clock: Clock,
        sessions: Arc<dyn SessionRepository>,
        statistics: Arc<StatisticsAggregator>,
    ) -> Self {
        Self {
            clock,
            sessions,
            statistics,
        }
    }

    /// Open a session starting now.
    ///
    /// Several sessions may be open for one user at the same time.
    ///
    /// # Errors
    ///
    /// Returns `SessionLogError::Session` if the exam is blank.
    /// Returns `SessionLogError::Storage` if persistence fails.
    pub async fn start(&self, request: StartSession) -> Result<SessionId, SessionLogError> {
        let new = NewSession::new(
            request.user_id,
            request.exam,
            request.subject,
            request.topic,
            request.session_type,
            self.clock.now(),
        )?;
        let id = self.sessions.insert_session(&new).await?;
        tracing::info!(
            user_id = %new.user_id,
            session_id = %id,
            exam = %new.exam,
            session_type = %new.session_type,
            "study session started"
        );
        Ok(id)
    }

    /// Close a session now and add its duration to the user's study time.
    ///
    /// # Errors
    ///
    /// Returns `SessionLogError::NotFound` if the id is unknown or the session
    /// already ended; nothing is changed in that case.
    /// Returns `SessionLogError::Storage` if persistence fails.
    pub async fn end(
        &self,
        id: SessionId,
        notes: Option<String>,
    ) -> Result<EndedSession, SessionLogError> {
        let mut session = self
            .sessions
            .get_session(id)
            .await?
            .ok_or(SessionLogError::NotFound)?;
        if session.is_ended() {
            return Err(SessionLogError::NotFound);
        }

        let minutes = session.finish(self.clock.now(), notes)?;
        if !self.sessions.finish_session(&session).await? {
            return Err(SessionLogError::NotFound);
        }
        self.statistics
            .record_session_time(session.user_id(), minutes)
            .await?;

        tracing::info!(
            user_id = %session.user_id(),
            session_id = %id,
            duration_minutes = minutes,
            "study session ended"
        );
        Ok(EndedSession {
            id,
            duration_minutes: minutes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use storage::repository::{InMemoryRepository, StatisticsRepository};
    use tracker_core::Catalog;
    use tracker_core::time::fixed_now;

    fn log_at(repo: &InMemoryRepository, clock: Clock) -> SessionLog {
        let statistics = Arc::new(StatisticsAggregator::new(
            clock,
            Arc::new(Catalog::builtin().clone()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        ));
        SessionLog::new(clock, Arc::new(repo.clone()), statistics)
    }

    fn request() -> StartSession {
        StartSession {
            user_id: UserId::new("u1").unwrap(),
            exam: "JEE".into(),
            subject: None,
            topic: None,
            session_type: SessionType::Study,
        }
    }

    #[tokio::test]
    async fn ten_minute_session_adds_study_time() {
        let repo = InMemoryRepository::new();
        let id = log_at(&repo, Clock::fixed(fixed_now()))
            .start(request())
            .await
            .unwrap();

        let ended = log_at(&repo, Clock::fixed(fixed_now() + Duration::minutes(10)))
            .end(id, None)
            .await
            .unwrap();
        assert_eq!(ended.duration_minutes, 10);

        let stats = repo
            .get_statistics(&UserId::new("u1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stats.total_study_time, 10);
    }

    #[tokio::test]
    async fn ending_twice_or_unknown_is_not_found() {
        let repo = InMemoryRepository::new();
        let log = log_at(&repo, Clock::fixed(fixed_now()));
        let id = log.start(request()).await.unwrap();
        log.end(id, Some("done".into())).await.unwrap();

        assert!(matches!(log.end(id, None).await, Err(SessionLogError::NotFound)));
        assert!(matches!(
            log.end(SessionId::new(999), None).await,
            Err(SessionLogError::NotFound)
        ));
    }

    #[tokio::test]
    async fn blank_exam_is_rejected() {
        let repo = InMemoryRepository::new();
        let mut req = request();
        req.exam = " ".into();
        let err = log_at(&repo, Clock::fixed(fixed_now())).start(req).await.unwrap_err();
        assert!(matches!(err, SessionLogError::Session(_)));
    }
}
