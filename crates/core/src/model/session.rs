use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{SessionId, UserId};
use crate::time::elapsed_minutes;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("exam cannot be empty")]
    EmptyExam,

    #[error("unknown session type: {0}")]
    UnknownType(String),

    #[error("session already ended")]
    AlreadyEnded,

    #[error("ended_at is before started_at")]
    InvalidTimeRange,
}

/// What the user was doing during a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    #[default]
    Study,
    Practice,
    Revision,
    MockTest,
}

impl SessionType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionType::Study => "study",
            SessionType::Practice => "practice",
            SessionType::Revision => "revision",
            SessionType::MockTest => "mock_test",
        }
    }
}

impl FromStr for SessionType {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "study" => Ok(SessionType::Study),
            "practice" => Ok(SessionType::Practice),
            "revision" => Ok(SessionType::Revision),
            "mock_test" | "test" => Ok(SessionType::MockTest),
            _ => Err(SessionError::UnknownType(s.to_owned())),
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for opening a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub user_id: UserId,
    pub exam: String,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub session_type: SessionType,
    pub started_at: DateTime<Utc>,
}

impl NewSession {
    /// Validate and normalize the optional scope fields.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyExam` if the exam is blank.
    pub fn new(
        user_id: UserId,
        exam: impl AsRef<str>,
        subject: Option<String>,
        topic: Option<String>,
        session_type: SessionType,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let exam = exam.as_ref().trim();
        if exam.is_empty() {
            return Err(SessionError::EmptyExam);
        }
        Ok(Self {
            user_id,
            exam: exam.to_owned(),
            subject: normalize_optional(subject),
            topic: normalize_optional(topic),
            session_type,
            started_at,
        })
    }
}

/// A timed interval of study activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudySession {
    id: SessionId,
    user_id: UserId,
    exam: String,
    subject: Option<String>,
    topic: Option<String>,
    session_type: SessionType,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    duration_minutes: u32,
    notes: Option<String>,
}

impl StudySession {
    #[must_use]
    pub fn open(id: SessionId, new: NewSession) -> Self {
        Self {
            id,
            user_id: new.user_id,
            exam: new.exam,
            subject: new.subject,
            topic: new.topic,
            session_type: new.session_type,
            started_at: new.started_at,
            ended_at: None,
            duration_minutes: 0,
            notes: None,
        }
    }

    /// Rehydrate a session from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTimeRange` if `ended_at` precedes `started_at`.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: SessionId,
        user_id: UserId,
        exam: String,
        subject: Option<String>,
        topic: Option<String>,
        session_type: SessionType,
        started_at: DateTime<Utc>,
        ended_at: Option<DateTime<Utc>>,
        duration_minutes: u32,
        notes: Option<String>,
    ) -> Result<Self, SessionError> {
        if ended_at.is_some_and(|end| end < started_at) {
            return Err(SessionError::InvalidTimeRange);
        }
        Ok(Self {
            id,
            user_id,
            exam,
            subject,
            topic,
            session_type,
            started_at,
            ended_at,
            duration_minutes,
            notes,
        })
    }

    /// Close the session at `now`, returning the whole-minute duration.
    ///
    /// A clock that reads earlier than the start yields zero minutes and an
    /// end time equal to the start.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyEnded` if the session was closed before.
    pub fn finish(&mut self, now: DateTime<Utc>, notes: Option<String>) -> Result<u32, SessionError> {
        if self.ended_at.is_some() {
            return Err(SessionError::AlreadyEnded);
        }
        let ended_at = now.max(self.started_at);
        self.duration_minutes = elapsed_minutes(self.started_at, ended_at);
        self.ended_at = Some(ended_at);
        self.notes = normalize_optional(notes);
        Ok(self.duration_minutes)
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn exam(&self) -> &str {
        &self.exam
    }

    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    #[must_use]
    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn open_session() -> StudySession {
        let new = NewSession::new(
            UserId::new("u1").unwrap(),
            "JEE",
            Some("Physics".into()),
            Some("  ".into()),
            SessionType::Study,
            fixed_now(),
        )
        .unwrap();
        StudySession::open(SessionId::new(1), new)
    }

    #[test]
    fn blank_scope_fields_are_dropped() {
        let session = open_session();
        assert_eq!(session.subject(), Some("Physics"));
        assert_eq!(session.topic(), None);
    }

    #[test]
    fn finish_records_duration_once() {
        let mut session = open_session();
        let minutes = session
            .finish(fixed_now() + Duration::minutes(10), Some("waves".into()))
            .unwrap();
        assert_eq!(minutes, 10);
        assert_eq!(session.notes(), Some("waves"));
        assert_eq!(
            session.finish(fixed_now() + Duration::minutes(20), None),
            Err(SessionError::AlreadyEnded)
        );
        assert_eq!(session.duration_minutes(), 10);
    }

    #[test]
    fn finish_before_start_is_zero_minutes() {
        let mut session = open_session();
        assert_eq!(session.finish(fixed_now() - Duration::minutes(3), None), Ok(0));
        assert_eq!(session.ended_at(), Some(fixed_now()));
    }

    #[test]
    fn session_type_parsing() {
        assert_eq!("Study".parse::<SessionType>().unwrap(), SessionType::Study);
        assert_eq!("test".parse::<SessionType>().unwrap(), SessionType::MockTest);
        assert!("nap".parse::<SessionType>().is_err());
    }

    #[test]
    fn blank_exam_is_rejected() {
        let err = NewSession::new(
            UserId::new("u1").unwrap(),
            " ",
            None,
            None,
            SessionType::Study,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, SessionError::EmptyExam);
    }
}
