use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectionError {
    #[error("at least one exam must be selected")]
    NoExams,
}

/// The exams a user is preparing for; the first one is the primary exam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSelection {
    user_id: UserId,
    selected_exams: Vec<String>,
    selected_at: DateTime<Utc>,
}

impl UserSelection {
    /// Build a selection, trimming names and dropping blanks and repeats
    /// while keeping the submitted order.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::NoExams` if nothing remains.
    pub fn new<I, S>(
        user_id: UserId,
        exams: I,
        selected_at: DateTime<Utc>,
    ) -> Result<Self, SelectionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected_exams: Vec<String> = Vec::new();
        for exam in exams {
            let exam = exam.as_ref().trim();
            if exam.is_empty() || selected_exams.iter().any(|seen| seen == exam) {
                continue;
            }
            selected_exams.push(exam.to_owned());
        }
        if selected_exams.is_empty() {
            return Err(SelectionError::NoExams);
        }
        Ok(Self {
            user_id,
            selected_exams,
            selected_at,
        })
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn selected_exams(&self) -> &[String] {
        &self.selected_exams
    }

    /// The primary exam, kept for callers that only understand one.
    #[must_use]
    pub fn selected_exam(&self) -> &str {
        // `new` guarantees at least one entry.
        &self.selected_exams[0]
    }

    #[must_use]
    pub fn selected_at(&self) -> DateTime<Utc> {
        self.selected_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn keeps_order_and_drops_repeats() {
        let selection = UserSelection::new(
            UserId::new("u1").unwrap(),
            ["NEET", " JEE ", "NEET", ""],
            fixed_now(),
        )
        .unwrap();
        assert_eq!(selection.selected_exams(), ["NEET", "JEE"]);
        assert_eq!(selection.selected_exam(), "NEET");
    }

    #[test]
    fn empty_selection_is_rejected() {
        let err = UserSelection::new(UserId::new("u1").unwrap(), Vec::<String>::new(), fixed_now())
            .unwrap_err();
        assert_eq!(err, SelectionError::NoExams);
    }
}
