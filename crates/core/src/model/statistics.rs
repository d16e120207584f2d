use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::model::{ProgressTree, UserId};

/// Completion percentage rounded to one decimal; zero when there is nothing to complete.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn completion_percentage(completed: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = f64::from(completed) / f64::from(total) * 100.0;
    (pct * 10.0).round() / 10.0
}

/// Counts derived from progress rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub total_exams: u32,
    pub total_topics: u32,
    pub completed_topics: u32,
    pub completion_percentage: f64,
}

impl ProgressSummary {
    /// Summarize every row in `tree`; a topic counts as completed only when
    /// all three categories are done.
    #[must_use]
    pub fn from_tree(tree: &ProgressTree) -> Self {
        let total_exams = saturating_u32(tree.exams().count());
        let total_topics = saturating_u32(tree.rows().count());
        let completed_topics = saturating_u32(tree.rows().filter(|row| row.is_complete()).count());
        Self {
            total_exams,
            total_topics,
            completed_topics,
            completion_percentage: completion_percentage(completed_topics, total_topics),
        }
    }
}

/// Per-exam totals measured against the syllabus rather than stored rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ExamStats {
    pub total_topics: u32,
    pub completed_topics: u32,
    pub completion_percentage: f64,
}

impl ExamStats {
    #[must_use]
    pub fn new(total_topics: u32, completed_topics: u32) -> Self {
        Self {
            total_topics,
            completed_topics,
            completion_percentage: completion_percentage(completed_topics, total_topics),
        }
    }
}

/// Cached per-user statistics, updated incrementally.
#[derive(Debug, Clone, PartialEq)]
pub struct UserStatistics {
    pub user_id: UserId,
    /// Minutes.
    pub total_study_time: u64,
    pub study_streak: u32,
    pub last_study_date: Option<DateTime<Utc>>,
    pub total_topics_completed: u32,
    pub total_exams_started: u32,
    pub achievements: Vec<Value>,
    pub weekly_goals: Map<String, Value>,
}

impl UserStatistics {
    /// All-zero statistics for a user with no history.
    #[must_use]
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            total_study_time: 0,
            study_streak: 0,
            last_study_date: None,
            total_topics_completed: 0,
            total_exams_started: 0,
            achievements: Vec::new(),
            weekly_goals: Map::new(),
        }
    }

    pub fn add_study_time(&mut self, minutes: u32, at: DateTime<Utc>) {
        self.total_study_time = self.total_study_time.saturating_add(u64::from(minutes));
        self.last_study_date = Some(at);
    }

    pub fn apply_summary(&mut self, summary: &ProgressSummary) {
        self.total_topics_completed = summary.completed_topics;
        self.total_exams_started = summary.total_exams;
    }
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TopicKey, TopicProgress, TopicStatus};
    use crate::time::fixed_now;

    #[test]
    fn percentage_rounds_to_one_decimal() {
        assert_eq!(completion_percentage(1, 3), 33.3);
        assert_eq!(completion_percentage(2, 3), 66.7);
        assert_eq!(completion_percentage(0, 0), 0.0);
        assert_eq!(completion_percentage(5, 5), 100.0);
    }

    #[test]
    fn empty_tree_summarizes_to_zero() {
        let summary = ProgressSummary::from_tree(&ProgressTree::new());
        assert_eq!(summary, ProgressSummary::default());
    }

    #[test]
    fn summary_counts_only_fully_done_topics() {
        let now = fixed_now();
        let tree: ProgressTree = [
            TopicProgress::record(
                TopicKey::new("JEE", "Physics", "Gravitation").unwrap(),
                TopicStatus::all_done(),
                now,
            ),
            TopicProgress::record(
                TopicKey::new("JEE", "Physics", "Wave Optics").unwrap(),
                TopicStatus::new(true, true, false),
                now,
            ),
            TopicProgress::zeroed(TopicKey::new("NEET", "Biology", "Ecosystem").unwrap()),
            TopicProgress::zeroed(TopicKey::new("NEET", "Biology", "Evolution").unwrap()),
        ]
        .into_iter()
        .collect();

        let summary = ProgressSummary::from_tree(&tree);
        assert_eq!(summary.total_exams, 2);
        assert_eq!(summary.total_topics, 4);
        assert_eq!(summary.completed_topics, 1);
        assert_eq!(summary.completion_percentage, 25.0);
    }

    #[test]
    fn study_time_accumulates() {
        let mut stats = UserStatistics::empty(UserId::new("u1").unwrap());
        stats.add_study_time(10, fixed_now());
        stats.add_study_time(5, fixed_now());
        assert_eq!(stats.total_study_time, 15);
        assert_eq!(stats.last_study_date, Some(fixed_now()));
        assert_eq!(stats.study_streak, 0);
    }
}
