use chrono::Duration;
use serde_json::json;
use storage::repository::{
    ActivityRepository, ProgressRepository, SelectionRepository, SessionRepository,
    SettingsRepository, StatisticsRepository,
};
use storage::sqlite::SqliteRepository;
use tracker_core::model::{
    ActivityEntry, NewSession, ProgressSummary, SessionType, TopicKey, TopicProgress, TopicStatus,
    UserId, UserSelection, UserSettingsDraft,
};
use tracker_core::time::fixed_now;

async fn repo(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn user() -> UserId {
    UserId::new("student-1").unwrap()
}

#[tokio::test]
async fn progress_upsert_round_trips_and_stays_unique() {
    let repo = repo("memdb_progress").await;
    let key = TopicKey::new("JEE", "Physics", "Gravitation").unwrap();

    let partial = TopicProgress::record(key.clone(), TopicStatus::new(true, false, false), fixed_now());
    repo.upsert_topic(&user(), &partial).await.unwrap();
    let done = TopicProgress::record(key.clone(), TopicStatus::all_done(), fixed_now());
    repo.upsert_topic(&user(), &done).await.unwrap();
    repo.upsert_topic(&user(), &done).await.unwrap();

    let tree = repo.get_progress(&user(), Some("JEE")).await.unwrap();
    assert_eq!(tree.rows().count(), 1);
    let stored = tree.get("JEE", "Physics", "Gravitation").unwrap();
    assert_eq!(stored, &done);
    assert_eq!(stored.completed_at(), Some(fixed_now()));
}

#[tokio::test]
async fn seeding_only_inserts_missing_rows() {
    let repo = repo("memdb_seed").await;
    let key = TopicKey::new("NEET", "Biology", "Evolution").unwrap();
    let done = TopicProgress::record(key.clone(), TopicStatus::all_done(), fixed_now());
    repo.upsert_topic(&user(), &done).await.unwrap();

    assert!(!repo.seed_topic(&user(), &key).await.unwrap());
    let other = TopicKey::new("NEET", "Biology", "Ecosystem").unwrap();
    assert!(repo.seed_topic(&user(), &other).await.unwrap());

    assert!(repo.get_topic(&user(), &key).await.unwrap().unwrap().is_complete());
    let seeded = repo.get_topic(&user(), &other).await.unwrap().unwrap();
    assert_eq!(seeded.status(), TopicStatus::default());
    assert_eq!(seeded.completed_at(), None);
}

#[tokio::test]
async fn missing_rows_read_as_empty() {
    let repo = repo("memdb_empty").await;
    assert!(repo.get_progress(&user(), None).await.unwrap().is_empty());
    assert!(repo.get_selection(&user()).await.unwrap().is_none());
    assert!(repo.get_statistics(&user()).await.unwrap().is_none());
    assert!(repo.get_settings(&user()).await.unwrap().is_none());
    assert!(repo.recent_activity(&user(), 50).await.unwrap().is_empty());
}

#[tokio::test]
async fn selection_keeps_order() {
    let repo = repo("memdb_selection").await;
    let selection = UserSelection::new(user(), ["NEET", "JEE"], fixed_now()).unwrap();
    repo.save_selection(&selection).await.unwrap();

    let stored = repo.get_selection(&user()).await.unwrap().unwrap();
    assert_eq!(stored.selected_exam(), "NEET");
    assert_eq!(stored.selected_exams(), ["NEET".to_string(), "JEE".to_string()]);
}

#[tokio::test]
async fn session_lifecycle_and_recent_count() {
    let repo = repo("memdb_sessions").await;
    let start = fixed_now();
    let new = NewSession::new(
        user(),
        "JEE",
        Some("Physics".into()),
        None,
        SessionType::Practice,
        start,
    )
    .unwrap();
    let id = repo.insert_session(&new).await.unwrap();

    let mut session = repo.get_session(id).await.unwrap().unwrap();
    assert!(!session.is_ended());
    assert_eq!(session.subject(), Some("Physics"));

    session
        .finish(start + Duration::minutes(10), Some("ok".into()))
        .unwrap();
    assert!(repo.finish_session(&session).await.unwrap());
    assert!(!repo.finish_session(&session).await.unwrap());

    let stored = repo.get_session(id).await.unwrap().unwrap();
    assert_eq!(stored.duration_minutes(), 10);
    assert_eq!(stored.notes(), Some("ok"));
    assert_eq!(stored.session_type(), SessionType::Practice);

    assert_eq!(
        repo.count_sessions_since(&user(), start - Duration::days(7))
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        repo.count_sessions_since(&user(), start + Duration::seconds(1))
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn study_time_accumulates_atomically() {
    let repo = repo("memdb_stats").await;
    repo.add_study_time(&user(), 10, fixed_now()).await.unwrap();
    repo.add_study_time(&user(), 5, fixed_now()).await.unwrap();
    let summary = ProgressSummary {
        total_exams: 2,
        total_topics: 10,
        completed_topics: 3,
        completion_percentage: 30.0,
    };
    repo.record_progress_counts(&user(), &summary).await.unwrap();

    let stats = repo.get_statistics(&user()).await.unwrap().unwrap();
    assert_eq!(stats.total_study_time, 15);
    assert_eq!(stats.total_topics_completed, 3);
    assert_eq!(stats.total_exams_started, 2);
    assert_eq!(stats.study_streak, 0);
    assert_eq!(stats.last_study_date, Some(fixed_now()));
    assert!(stats.achievements.is_empty());
}

#[tokio::test]
async fn settings_round_trip_json_fields() {
    let repo = repo("memdb_settings").await;
    let draft: UserSettingsDraft = serde_json::from_value(json!({
        "dark_mode": true,
        "theme_preferences": {"accent": "teal"},
    }))
    .unwrap();
    let settings = draft.validate().unwrap();
    repo.save_settings(&user(), &settings).await.unwrap();

    let stored = repo.get_settings(&user()).await.unwrap().unwrap();
    assert_eq!(stored, settings);
    assert!(stored.dark_mode());
    assert_eq!(stored.theme_preferences()["accent"], "teal");
}

#[tokio::test]
async fn activity_is_listed_newest_first() {
    let repo = repo("memdb_activity").await;
    for minute in 0..3 {
        let entry = ActivityEntry::new(user(), "timer_started", fixed_now() + Duration::minutes(minute))
            .unwrap()
            .with_data(json!({"n": minute}))
            .with_duration(25);
        repo.append_activity(&entry).await.unwrap();
    }

    let recent = repo.recent_activity(&user(), 2).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].activity_data["n"], 2);
    assert_eq!(recent[1].activity_data["n"], 1);
    assert_eq!(recent[0].session_duration, 25);
}
