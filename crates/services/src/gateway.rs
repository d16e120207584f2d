//! Normalizes the progress payload shapes clients send into one [`UpdateBatch`].
//!
//! Four entry points exist:
//!
//! - [`parse_form`]: flat form fields named `Subject__Topic__Category`;
//! - [`parse_nested`]: `{exam, userId, progress: {subject: {topic: {..}}}}`;
//! - [`parse_bulk`]: `{user_id, progress: {exam: {subject: {topic: {..}}}}}`;
//! - [`parse_patch`]: a per-exam merge patch where absent categories keep
//!   their stored value.
//!
//! Missing identifying fields reject the request. Individual malformed keys
//! or leaves are dropped and counted in [`UpdateBatch::skipped`].

use serde_json::{Map, Value};
use tracker_core::model::{
    Category, StatusPatch, TopicKey, TopicStatus, UserId, parse_status_token,
};

use crate::error::PayloadError;

/// How an update combines with the stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// Overwrite all three flags.
    Replace(TopicStatus),
    /// Overwrite only the flags present.
    Merge(StatusPatch),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicUpdate {
    pub key: TopicKey,
    pub change: StatusChange,
}

/// A normalized set of updates for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBatch {
    pub user_id: UserId,
    /// The exam named by single-exam shapes; `None` for bulk sync.
    pub exam: Option<String>,
    pub entries: Vec<TopicUpdate>,
    pub skipped: u32,
}

/// Parse a form submission.
///
/// `exam` and `user_id` are read from their own fields. A category missing
/// for a topic that has at least one valid field counts as not done.
///
/// # Errors
///
/// Returns `PayloadError::MissingExam` or `PayloadError::MissingUserId`
/// when either identifying field is absent or blank.
pub fn parse_form(fields: &[(String, String)]) -> Result<UpdateBatch, PayloadError> {
    let mut exam: Option<&str> = None;
    let mut user: Option<&str> = None;
    let mut topics: Vec<((&str, &str), StatusPatch)> = Vec::new();
    let mut skipped = 0_u32;

    for (name, value) in fields {
        match name.as_str() {
            "exam" => {
                exam = Some(value.as_str());
                continue;
            }
            "user_id" | "userId" => {
                user = Some(value.as_str());
                continue;
            }
            _ => {}
        }

        let Some((subject, topic, category)) = split_form_key(name) else {
            skipped += 1;
            continue;
        };
        let (Ok(category), Ok(flag)) = (category.parse::<Category>(), parse_status_token(value))
        else {
            skipped += 1;
            continue;
        };

        match topics.iter_mut().find(|(id, _)| *id == (subject, topic)) {
            Some((_, patch)) => patch.set(category, flag),
            None => {
                let mut patch = StatusPatch::default();
                patch.set(category, flag);
                topics.push(((subject, topic), patch));
            }
        }
    }

    let exam = required(exam).ok_or(PayloadError::MissingExam)?;
    let user_id = user_id(user)?;

    let mut entries = Vec::with_capacity(topics.len());
    for ((subject, topic), patch) in topics {
        match TopicKey::new(exam, subject, topic) {
            Ok(key) => entries.push(TopicUpdate {
                key,
                change: StatusChange::Replace(patch.into_status()),
            }),
            Err(_) => skipped += 1,
        }
    }

    Ok(UpdateBatch {
        user_id,
        exam: Some(exam.to_owned()),
        entries,
        skipped,
    })
}

/// Parse a nested JSON save for one exam.
///
/// # Errors
///
/// Returns `PayloadError` if the body is not an object, the exam or user id
/// is missing, or `progress` is present but not an object.
pub fn parse_nested(body: &Value) -> Result<UpdateBatch, PayloadError> {
    let body = body.as_object().ok_or(PayloadError::NotAnObject("body"))?;
    let exam = required(body.get("exam").and_then(Value::as_str)).ok_or(PayloadError::MissingExam)?;
    let user_id = user_id(json_user(body))?;

    let mut batch = UpdateBatch {
        user_id,
        exam: Some(exam.to_owned()),
        entries: Vec::new(),
        skipped: 0,
    };
    if let Some(subjects) = progress_object(body)? {
        collect_exam(exam, subjects, false, &mut batch);
    }
    Ok(batch)
}

/// Parse a bulk sync spanning any number of exams.
///
/// # Errors
///
/// Returns `PayloadError` if the body is not an object, the user id is
/// missing, or `progress` is present but not an object.
pub fn parse_bulk(body: &Value) -> Result<UpdateBatch, PayloadError> {
    let body = body.as_object().ok_or(PayloadError::NotAnObject("body"))?;
    let user_id = user_id(json_user(body))?;

    let mut batch = UpdateBatch {
        user_id,
        exam: None,
        entries: Vec::new(),
        skipped: 0,
    };
    if let Some(exams) = progress_object(body)? {
        for (exam, subjects) in exams {
            match (exam.trim(), subjects.as_object()) {
                (exam, Some(subjects)) if !exam.is_empty() => {
                    collect_exam(exam, subjects, false, &mut batch);
                }
                _ => batch.skipped += 1,
            }
        }
    }
    Ok(batch)
}

/// Parse a merge patch for one exam.
///
/// `body` is either `{subject: {topic: {..}}}` or the same wrapped in
/// `{"progress": ..}`. Leaves carrying no category are skipped.
///
/// # Errors
///
/// Returns `PayloadError` if the user id or exam is blank or the body is not
/// an object.
pub fn parse_patch(user_id: &str, exam: &str, body: &Value) -> Result<UpdateBatch, PayloadError> {
    let user_id = self::user_id(Some(user_id))?;
    let exam = required(Some(exam)).ok_or(PayloadError::MissingExam)?;
    let body = body.as_object().ok_or(PayloadError::NotAnObject("body"))?;
    let subjects = progress_object(body)?.unwrap_or(body);

    let mut batch = UpdateBatch {
        user_id,
        exam: Some(exam.to_owned()),
        entries: Vec::new(),
        skipped: 0,
    };
    collect_exam(exam, subjects, true, &mut batch);
    Ok(batch)
}

fn split_form_key(name: &str) -> Option<(&str, &str, &str)> {
    let mut parts = name.split("__");
    let (Some(subject), Some(topic), Some(category), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    let (subject, topic, category) = (subject.trim(), topic.trim(), category.trim());
    if subject.is_empty() || topic.is_empty() || category.is_empty() {
        return None;
    }
    Some((subject, topic, category))
}

fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn user_id(raw: Option<&str>) -> Result<UserId, PayloadError> {
    let raw = required(raw).ok_or(PayloadError::MissingUserId)?;
    Ok(UserId::new(raw)?)
}

fn json_user(body: &Map<String, Value>) -> Option<&str> {
    body.get("userId")
        .or_else(|| body.get("user_id"))
        .and_then(Value::as_str)
}

fn progress_object(body: &Map<String, Value>) -> Result<Option<&Map<String, Value>>, PayloadError> {
    match body.get("progress") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(PayloadError::NotAnObject("progress")),
    }
}

fn collect_exam(exam: &str, subjects: &Map<String, Value>, merge: bool, batch: &mut UpdateBatch) {
    for (subject, topics) in subjects {
        let Some(topics) = topics.as_object() else {
            batch.skipped += 1;
            continue;
        };
        for (topic, leaf) in topics {
            let parsed = parse_leaf(leaf).filter(|patch| !(merge && patch.is_empty()));
            let key = TopicKey::new(exam, subject, topic);
            match (parsed, key) {
                (Some(patch), Ok(key)) => batch.entries.push(TopicUpdate {
                    key,
                    change: if merge {
                        StatusChange::Merge(patch)
                    } else {
                        StatusChange::Replace(patch.into_status())
                    },
                }),
                _ => batch.skipped += 1,
            }
        }
    }
}

/// Read `{Theory, Practice, Revision}` in any key case. Unrelated keys are
/// ignored; an unreadable category value rejects the leaf.
fn parse_leaf(leaf: &Value) -> Option<StatusPatch> {
    let leaf = leaf.as_object()?;
    let mut patch = StatusPatch::default();
    for (name, raw) in leaf {
        let Ok(category) = name.parse::<Category>() else {
            continue;
        };
        let flag = match raw {
            Value::Bool(flag) => *flag,
            Value::String(token) => parse_status_token(token).ok()?,
            Value::Number(n) => match n.as_u64() {
                Some(0) => false,
                Some(1) => true,
                _ => return None,
            },
            Value::Null => false,
            _ => return None,
        };
        patch.set(category, flag);
    }
    Some(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(fields: &[(&str, &str)]) -> Vec<(String, String)> {
        fields
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn replaced(batch: &UpdateBatch, topic: &str) -> TopicStatus {
        match batch
            .entries
            .iter()
            .find(|e| e.key.topic() == topic)
            .map(|e| e.change)
        {
            Some(StatusChange::Replace(status)) => status,
            other => panic!("expected replace for {topic}, got {other:?}"),
        }
    }

    #[test]
    fn form_groups_fields_and_defaults_missing_categories() {
        let batch = parse_form(&form(&[
            ("exam", "JEE"),
            ("user_id", "u1"),
            ("Physics__Waves and Sound__Theory", "true"),
            ("Physics__Waves and Sound__practice", "Completed"),
            ("Physics__Gravitation__Revision", "on"),
        ]))
        .unwrap();

        assert_eq!(batch.user_id.as_str(), "u1");
        assert_eq!(batch.exam.as_deref(), Some("JEE"));
        assert_eq!(batch.skipped, 0);
        assert_eq!(batch.entries.len(), 2);
        assert_eq!(replaced(&batch, "Waves and Sound"), TopicStatus::new(true, true, false));
        assert_eq!(replaced(&batch, "Gravitation"), TopicStatus::new(false, false, true));
    }

    #[test]
    fn form_skips_malformed_fields() {
        let batch = parse_form(&form(&[
            ("exam", "JEE"),
            ("user_id", "u1"),
            ("BadKey", "true"),
            ("A__B__C__D", "true"),
            ("Physics____Theory", "true"),
            ("Physics__Optics__Mastery", "true"),
            ("Physics__Optics__Theory", "maybe"),
        ]))
        .unwrap();

        assert!(batch.entries.is_empty());
        assert_eq!(batch.skipped, 5);
    }

    #[test]
    fn form_later_duplicates_win() {
        let batch = parse_form(&form(&[
            ("exam", "JEE"),
            ("user_id", "u1"),
            ("Physics__Optics__Theory", "true"),
            ("Physics__Optics__Theory", "false"),
        ]))
        .unwrap();
        assert_eq!(replaced(&batch, "Optics"), TopicStatus::default());
    }

    #[test]
    fn form_requires_identity() {
        let err = parse_form(&form(&[("user_id", "u1")])).unwrap_err();
        assert_eq!(err, PayloadError::MissingExam);
        let err = parse_form(&form(&[("exam", "JEE"), ("user_id", "  ")])).unwrap_err();
        assert_eq!(err, PayloadError::MissingUserId);
    }

    #[test]
    fn nested_reads_case_insensitive_leaves_and_tokens() {
        let body = json!({
            "exam": "NEET",
            "userId": "u1",
            "progress": {
                "Biology": {
                    "Evolution": {"theory": true, "PRACTICE": "done", "Revision": "pending"},
                    "Ecosystem": "not a leaf",
                    "Genetics": {"Theory": "sometimes"}
                }
            }
        });
        let batch = parse_nested(&body).unwrap();
        assert_eq!(batch.entries.len(), 1);
        assert_eq!(batch.skipped, 2);
        assert_eq!(replaced(&batch, "Evolution"), TopicStatus::new(true, true, false));
    }

    #[test]
    fn nested_without_progress_is_empty() {
        let batch = parse_nested(&json!({"exam": "NEET", "user_id": "u1"})).unwrap();
        assert!(batch.entries.is_empty());
        assert_eq!(
            parse_nested(&json!({"userId": "u1"})).unwrap_err(),
            PayloadError::MissingExam
        );
        assert_eq!(
            parse_nested(&json!({"exam": "NEET", "userId": "u1", "progress": [1]})).unwrap_err(),
            PayloadError::NotAnObject("progress")
        );
    }

    #[test]
    fn bulk_spans_exams() {
        let body = json!({
            "user_id": "u1",
            "progress": {
                "JEE": {"Physics": {"Gravitation": {"theory": true, "practice": true, "revision": true}}},
                "NEET": {"Biology": {"Evolution": {"theory": false}}},
                "UGEE": "broken"
            }
        });
        let batch = parse_bulk(&body).unwrap();
        assert_eq!(batch.exam, None);
        assert_eq!(batch.entries.len(), 2);
        assert_eq!(batch.skipped, 1);
        let exams: Vec<&str> = batch.entries.iter().map(|e| e.key.exam()).collect();
        assert!(exams.contains(&"JEE") && exams.contains(&"NEET"));
    }

    #[test]
    fn patch_keeps_only_present_categories() {
        let body = json!({"Physics": {"Optics": {"practice": true}, "Empty": {}}});
        let batch = parse_patch("u1", "JEE", &body).unwrap();
        assert_eq!(batch.skipped, 1);
        assert_eq!(
            batch.entries[0].change,
            StatusChange::Merge(StatusPatch {
                theory: None,
                practice: Some(true),
                revision: None,
            })
        );

        let wrapped = json!({"progress": body});
        assert_eq!(parse_patch("u1", "JEE", &wrapped).unwrap().entries.len(), 1);
    }
}
