//! Read-only exam syllabi: exam → subject → ordered topic names.
//!
//! A [`Catalog`] is built once at start-up and then shared immutably.

mod builtin;

use std::fmt;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::LazyLock;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{TopicKey, TopicKeyError};

static BUILTIN: LazyLock<Catalog> = LazyLock::new(|| {
    Catalog::from_exams(builtin::EXAMS.iter().map(|(exam, subjects)| {
        ExamSyllabus::new(
            *exam,
            subjects
                .iter()
                .map(|(subject, topics)| SubjectSyllabus::new(*subject, topics.iter().copied())),
        )
    }))
});

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("failed to read syllabus file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid syllabus JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("syllabus contains a blank name in {0}")]
    BlankName(String),

    #[error("syllabus defines no exams")]
    Empty,
}

/// Ordered topics of one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectSyllabus {
    name: String,
    topics: Vec<String>,
}

impl SubjectSyllabus {
    fn new<I, S>(name: impl Into<String>, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for topic in topics {
            let topic = topic.into();
            if !unique.contains(&topic) {
                unique.push(topic);
            }
        }
        Self {
            name: name.into(),
            topics: unique,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn topics(&self) -> &[String] {
        &self.topics
    }
}

/// Ordered subjects of one exam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamSyllabus {
    name: String,
    subjects: Vec<SubjectSyllabus>,
}

impl ExamSyllabus {
    fn new(name: impl Into<String>, subjects: impl IntoIterator<Item = SubjectSyllabus>) -> Self {
        Self {
            name: name.into(),
            subjects: subjects.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn subjects(&self) -> &[SubjectSyllabus] {
        &self.subjects
    }

    #[must_use]
    pub fn topic_count(&self) -> u32 {
        let n: usize = self.subjects.iter().map(|s| s.topics.len()).sum();
        u32::try_from(n).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn contains(&self, subject: &str, topic: &str) -> bool {
        self.subjects
            .iter()
            .any(|s| s.name == subject && s.topics.iter().any(|t| t == topic))
    }

    /// Keys for every topic of the exam, in syllabus order.
    ///
    /// # Errors
    ///
    /// Returns `TopicKeyError` only for catalogs built around validation,
    /// which [`Catalog`] constructors never produce.
    pub fn topic_keys(&self) -> Result<Vec<TopicKey>, TopicKeyError> {
        let mut keys = Vec::new();
        for subject in &self.subjects {
            for topic in &subject.topics {
                keys.push(TopicKey::new(&self.name, &subject.name, topic)?);
            }
        }
        Ok(keys)
    }
}

/// The full set of exam syllabi.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    exams: Vec<ExamSyllabus>,
}

impl Catalog {
    /// The syllabi bundled with the binary.
    #[must_use]
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    fn from_exams(exams: impl IntoIterator<Item = ExamSyllabus>) -> Self {
        Self {
            exams: exams.into_iter().collect(),
        }
    }

    /// Parse a catalog from `{exam: {subject: [topic, ...]}}` JSON, keeping
    /// the document's ordering.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the JSON is malformed, empty, or has blank names.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let raw: OrderedMap<OrderedMap<Vec<String>>> = serde_json::from_str(json)?;
        let mut exams = Vec::with_capacity(raw.0.len());
        for (exam, subjects) in raw.0 {
            let exam = exam.trim().to_owned();
            if exam.is_empty() {
                return Err(CatalogError::BlankName("exam list".into()));
            }
            let mut parsed = Vec::with_capacity(subjects.0.len());
            for (subject, topics) in subjects.0 {
                let subject = subject.trim().to_owned();
                if subject.is_empty() {
                    return Err(CatalogError::BlankName(exam));
                }
                let topics: Vec<String> = topics.iter().map(|t| t.trim().to_owned()).collect();
                if topics.iter().any(String::is_empty) {
                    return Err(CatalogError::BlankName(format!("{exam}/{subject}")));
                }
                parsed.push(SubjectSyllabus::new(subject, topics));
            }
            exams.push(ExamSyllabus::new(exam, parsed));
        }
        if exams.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self::from_exams(exams))
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    #[must_use]
    pub fn exam(&self, name: &str) -> Option<&ExamSyllabus> {
        self.exams.iter().find(|e| e.name == name)
    }

    #[must_use]
    pub fn contains_exam(&self, name: &str) -> bool {
        self.exam(name).is_some()
    }

    pub fn exam_names(&self) -> impl Iterator<Item = &str> {
        self.exams.iter().map(|e| e.name.as_str())
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.exams.len()))?;
        for exam in &self.exams {
            map.serialize_entry(&exam.name, &SubjectsRef(&exam.subjects))?;
        }
        map.end()
    }
}

struct SubjectsRef<'a>(&'a [SubjectSyllabus]);

impl Serialize for SubjectsRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for subject in self.0 {
            map.serialize_entry(&subject.name, &subject.topics)?;
        }
        map.end()
    }
}

/// JSON object read as a list of entries so document order survives.
struct OrderedMap<V>(Vec<(String, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    if entries.iter().any(|(seen, _): &(String, V)| *seen == key) {
                        return Err(de::Error::custom(format!("duplicate key {key:?}")));
                    }
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_known_exams() {
        let catalog = Catalog::builtin();
        assert_eq!(
            catalog.exam_names().collect::<Vec<_>>(),
            vec!["JEE", "IAT", "UGEE", "NEET"]
        );
        assert_eq!(catalog.exam("NEET").unwrap().topic_count(), 100);
        assert_eq!(catalog.exam("JEE").unwrap().topic_count(), 72);
        assert!(catalog
            .exam("JEE")
            .unwrap()
            .contains("Physics", "Waves and Sound"));
        assert!(!catalog.contains_exam("GATE"));
    }

    #[test]
    fn topic_keys_follow_syllabus_order() {
        let keys = Catalog::builtin().exam("UGEE").unwrap().topic_keys().unwrap();
        assert_eq!(keys.len(), 50);
        assert_eq!(keys[0].subject(), "Mathematics");
        assert_eq!(keys[0].topic(), "Number Theory and Divisibility");
    }

    #[test]
    fn json_round_trip_preserves_order() {
        let json = r#"{"B": {"Zoology": ["z", "a"], "Algebra": ["x"]}, "A": {"S": ["t"]}}"#;
        let catalog = Catalog::from_json_str(json).unwrap();
        assert_eq!(catalog.exam_names().collect::<Vec<_>>(), vec!["B", "A"]);
        let out = serde_json::to_string(&catalog).unwrap();
        assert_eq!(out, r#"{"B":{"Zoology":["z","a"],"Algebra":["x"]},"A":{"S":["t"]}}"#);
    }

    #[test]
    fn invalid_catalogs_are_rejected() {
        assert!(matches!(Catalog::from_json_str("{}"), Err(CatalogError::Empty)));
        assert!(matches!(
            Catalog::from_json_str(r#"{"X": {"S": [" "]}}"#),
            Err(CatalogError::BlankName(_))
        ));
        assert!(matches!(
            Catalog::from_json_str(r#"{"X": ["not", "subjects"]}"#),
            Err(CatalogError::Parse(_))
        ));
    }
}
