use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopicKeyError {
    #[error("exam cannot be empty")]
    EmptyExam,

    #[error("subject cannot be empty")]
    EmptySubject,

    #[error("topic cannot be empty")]
    EmptyTopic,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StatusParseError {
    #[error("unknown progress category: {0}")]
    UnknownCategory(String),

    #[error("unrecognised status token: {0}")]
    UnknownToken(String),
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// Independent progress dimension tracked per topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Theory,
    Practice,
    Revision,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Theory, Category::Practice, Category::Revision];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Theory => "Theory",
            Category::Practice => "Practice",
            Category::Revision => "Revision",
        }
    }
}

impl FromStr for Category {
    type Err = StatusParseError;

    /// Category names are matched case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "theory" => Ok(Category::Theory),
            "practice" => Ok(Category::Practice),
            "revision" => Ok(Category::Revision),
            _ => Err(StatusParseError::UnknownCategory(s.to_owned())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a submitted category value into a flag.
///
/// Accepts `true`/`false` in any case plus the status tokens the tracker
/// pages have historically sent.
///
/// # Errors
///
/// Returns `StatusParseError::UnknownToken` for anything else.
pub fn parse_status_token(raw: &str) -> Result<bool, StatusParseError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "completed" | "complete" | "done" | "yes" | "on" | "1" | "checked" => Ok(true),
        "false" | "pending" | "not_started" | "in_progress" | "no" | "off" | "0" | "" => {
            Ok(false)
        }
        _ => Err(StatusParseError::UnknownToken(raw.to_owned())),
    }
}

//
// ─── TOPIC KEY ─────────────────────────────────────────────────────────────────
//

/// Validated (exam, subject, topic) triple; the per-user unique key of a
/// progress row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TopicKey {
    exam: String,
    subject: String,
    topic: String,
}

impl TopicKey {
    /// Build a key from raw names, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `TopicKeyError` if any component is empty after trimming.
    pub fn new(
        exam: impl AsRef<str>,
        subject: impl AsRef<str>,
        topic: impl AsRef<str>,
    ) -> Result<Self, TopicKeyError> {
        let exam = exam.as_ref().trim();
        let subject = subject.as_ref().trim();
        let topic = topic.as_ref().trim();
        if exam.is_empty() {
            return Err(TopicKeyError::EmptyExam);
        }
        if subject.is_empty() {
            return Err(TopicKeyError::EmptySubject);
        }
        if topic.is_empty() {
            return Err(TopicKeyError::EmptyTopic);
        }
        Ok(Self {
            exam: exam.to_owned(),
            subject: subject.to_owned(),
            topic: topic.to_owned(),
        })
    }

    #[must_use]
    pub fn exam(&self) -> &str {
        &self.exam
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl fmt::Display for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.exam, self.subject, self.topic)
    }
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// The three category flags of a topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicStatus {
    pub theory: bool,
    pub practice: bool,
    pub revision: bool,
}

impl TopicStatus {
    #[must_use]
    pub fn new(theory: bool, practice: bool, revision: bool) -> Self {
        Self {
            theory,
            practice,
            revision,
        }
    }

    #[must_use]
    pub fn all_done() -> Self {
        Self::new(true, true, true)
    }

    #[must_use]
    pub fn get(&self, category: Category) -> bool {
        match category {
            Category::Theory => self.theory,
            Category::Practice => self.practice,
            Category::Revision => self.revision,
        }
    }

    pub fn set(&mut self, category: Category, value: bool) {
        match category {
            Category::Theory => self.theory = value,
            Category::Practice => self.practice = value,
            Category::Revision => self.revision = value,
        }
    }

    /// Canonical completion rule: all three categories are done.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.theory && self.practice && self.revision
    }

    /// True when any single category is done; gates `completed_at`.
    #[must_use]
    pub fn has_progress(&self) -> bool {
        self.theory || self.practice || self.revision
    }

    /// `completed_at` for a write happening at `now`.
    #[must_use]
    pub fn completed_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.has_progress().then_some(now)
    }
}

/// A category update where only some flags may be present.
///
/// Absent flags keep whatever the row already holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusPatch {
    pub theory: Option<bool>,
    pub practice: Option<bool>,
    pub revision: Option<bool>,
}

impl StatusPatch {
    pub fn set(&mut self, category: Category, value: bool) {
        match category {
            Category::Theory => self.theory = Some(value),
            Category::Practice => self.practice = Some(value),
            Category::Revision => self.revision = Some(value),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.theory.is_none() && self.practice.is_none() && self.revision.is_none()
    }

    /// Overlay present flags on top of `base`.
    #[must_use]
    pub fn apply_to(&self, base: TopicStatus) -> TopicStatus {
        TopicStatus {
            theory: self.theory.unwrap_or(base.theory),
            practice: self.practice.unwrap_or(base.practice),
            revision: self.revision.unwrap_or(base.revision),
        }
    }

    /// Treat absent flags as not done.
    #[must_use]
    pub fn into_status(self) -> TopicStatus {
        self.apply_to(TopicStatus::default())
    }
}

//
// ─── PROGRESS ROW ──────────────────────────────────────────────────────────────
//

/// Stored progress of one topic for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicProgress {
    key: TopicKey,
    status: TopicStatus,
    completed_at: Option<DateTime<Utc>>,
}

impl TopicProgress {
    /// A write of `status` at `now`, stamping `completed_at` when any category is done.
    #[must_use]
    pub fn record(key: TopicKey, status: TopicStatus, now: DateTime<Utc>) -> Self {
        Self {
            key,
            status,
            completed_at: status.completed_at(now),
        }
    }

    /// A zeroed row, as seeded on exam selection.
    #[must_use]
    pub fn zeroed(key: TopicKey) -> Self {
        Self {
            key,
            status: TopicStatus::default(),
            completed_at: None,
        }
    }

    /// Rehydrate a row from storage without re-deriving `completed_at`.
    #[must_use]
    pub fn from_persisted(
        key: TopicKey,
        status: TopicStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            key,
            status,
            completed_at,
        }
    }

    #[must_use]
    pub fn key(&self) -> &TopicKey {
        &self.key
    }

    #[must_use]
    pub fn status(&self) -> TopicStatus {
        self.status
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status.is_complete()
    }
}

/// Wire view of a progress row, keyed by its position in a [`ProgressTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicProgressView {
    pub theory: bool,
    pub practice: bool,
    pub revision: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed: bool,
}

impl From<&TopicProgress> for TopicProgressView {
    fn from(row: &TopicProgress) -> Self {
        Self {
            theory: row.status.theory,
            practice: row.status.practice,
            revision: row.status.revision,
            completed_at: row.completed_at,
            completed: row.is_complete(),
        }
    }
}

/// subject → topic → row
pub type SubjectProgress = BTreeMap<String, BTreeMap<String, TopicProgress>>;

/// exam → subject → topic → row, as returned by the progress store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressTree {
    exams: BTreeMap<String, SubjectProgress>,
}

impl ProgressTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, row: TopicProgress) {
        self.exams
            .entry(row.key.exam.clone())
            .or_default()
            .entry(row.key.subject.clone())
            .or_default()
            .insert(row.key.topic.clone(), row);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exams.is_empty()
    }

    #[must_use]
    pub fn exam(&self, exam: &str) -> Option<&SubjectProgress> {
        self.exams.get(exam)
    }

    #[must_use]
    pub fn get(&self, exam: &str, subject: &str, topic: &str) -> Option<&TopicProgress> {
        self.exams.get(exam)?.get(subject)?.get(topic)
    }

    pub fn exams(&self) -> impl Iterator<Item = &str> {
        self.exams.keys().map(String::as_str)
    }

    /// All rows in exam, subject, topic order.
    pub fn rows(&self) -> impl Iterator<Item = &TopicProgress> {
        self.exams
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::values)
    }

    /// `{subject: {topic: view}}` for one exam; empty when the exam has no rows.
    #[must_use]
    pub fn exam_view(&self, exam: &str) -> BTreeMap<String, BTreeMap<String, TopicProgressView>> {
        self.exams
            .get(exam)
            .map(|subjects| {
                subjects
                    .iter()
                    .map(|(subject, topics)| {
                        let topics = topics
                            .iter()
                            .map(|(topic, row)| (topic.clone(), TopicProgressView::from(row)))
                            .collect();
                        (subject.clone(), topics)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl FromIterator<TopicProgress> for ProgressTree {
    fn from_iter<I: IntoIterator<Item = TopicProgress>>(iter: I) -> Self {
        let mut tree = Self::new();
        for row in iter {
            tree.insert(row);
        }
        tree
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!("Theory".parse::<Category>().unwrap(), Category::Theory);
        assert_eq!("PRACTICE".parse::<Category>().unwrap(), Category::Practice);
        assert_eq!(" revision ".parse::<Category>().unwrap(), Category::Revision);
        assert!("Homework".parse::<Category>().is_err());
    }

    #[test]
    fn status_tokens() {
        assert!(parse_status_token("TRUE").unwrap());
        assert!(parse_status_token("completed").unwrap());
        assert!(!parse_status_token("False").unwrap());
        assert!(!parse_status_token("").unwrap());
        assert!(matches!(
            parse_status_token("maybe"),
            Err(StatusParseError::UnknownToken(_))
        ));
    }

    #[test]
    fn empty_key_parts_are_rejected() {
        assert_eq!(
            TopicKey::new("", "Physics", "Waves").unwrap_err(),
            TopicKeyError::EmptyExam
        );
        assert_eq!(
            TopicKey::new("JEE", "  ", "Waves").unwrap_err(),
            TopicKeyError::EmptySubject
        );
        assert_eq!(
            TopicKey::new("JEE", "Physics", "").unwrap_err(),
            TopicKeyError::EmptyTopic
        );
    }

    #[test]
    fn completion_requires_all_three() {
        let mut status = TopicStatus::all_done();
        assert!(status.is_complete());
        status.set(Category::Practice, false);
        assert!(!status.is_complete());
        assert!(status.has_progress());
    }

    #[test]
    fn completed_at_follows_any_flag() {
        let key = TopicKey::new("JEE", "Physics", "Waves and Sound").unwrap();
        let now = fixed_now();

        let partial = TopicProgress::record(key.clone(), TopicStatus::new(true, false, false), now);
        assert_eq!(partial.completed_at(), Some(now));
        assert!(!partial.is_complete());

        let none = TopicProgress::record(key, TopicStatus::default(), now);
        assert_eq!(none.completed_at(), None);
    }

    #[test]
    fn patch_keeps_absent_flags() {
        let base = TopicStatus::new(true, true, false);
        let mut patch = StatusPatch::default();
        patch.set(Category::Revision, true);
        assert_eq!(patch.apply_to(base), TopicStatus::all_done());
        assert_eq!(patch.into_status(), TopicStatus::new(false, false, true));
    }

    #[test]
    fn tree_groups_rows_by_exam_and_subject() {
        let now = fixed_now();
        let tree: ProgressTree = [
            TopicProgress::record(
                TopicKey::new("JEE", "Physics", "Gravitation").unwrap(),
                TopicStatus::all_done(),
                now,
            ),
            TopicProgress::zeroed(TopicKey::new("NEET", "Biology", "Ecosystem").unwrap()),
        ]
        .into_iter()
        .collect();

        assert_eq!(tree.exams().collect::<Vec<_>>(), vec!["JEE", "NEET"]);
        assert!(tree.get("JEE", "Physics", "Gravitation").unwrap().is_complete());
        let view = tree.exam_view("NEET");
        assert!(!view["Biology"]["Ecosystem"].completed);
        assert!(tree.exam_view("UGEE").is_empty());
    }
}
