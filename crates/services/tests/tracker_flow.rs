use std::sync::Arc;

use chrono::Duration;
use serde_json::json;
use services::{AppServices, Catalog, Clock, StartSession};
use storage::repository::Storage;
use tracker_core::model::{SessionType, TopicStatus, UserId};
use tracker_core::time::fixed_now;

fn services_at(storage: &Storage, clock: Clock) -> AppServices {
    AppServices::from_storage(storage, clock, Arc::new(Catalog::builtin().clone()))
}

fn user() -> UserId {
    UserId::new("student-1").unwrap()
}

#[tokio::test]
async fn nested_save_round_trips_through_progress_view() {
    let storage = Storage::in_memory();
    let app = services_at(&storage, Clock::fixed(fixed_now()));

    let body = json!({
        "exam": "JEE",
        "userId": "student-1",
        "progress": {"Physics": {"Waves and Sound": {"Theory": true, "Practice": false, "Revision": true}}}
    });
    let outcome = app.progress().save_nested(&body).await.unwrap();
    assert_eq!(outcome.applied, 1);
    assert_eq!(outcome.summary.completed_topics, 0);

    let tree = app.progress().progress(&user(), Some("JEE")).await.unwrap();
    let view = tree.exam_view("JEE");
    let leaf = &view["Physics"]["Waves and Sound"];
    assert!(leaf.theory && !leaf.practice && leaf.revision);
    assert!(!leaf.completed);
    assert_eq!(leaf.completed_at, Some(fixed_now()));
}

#[tokio::test]
async fn repeated_save_is_idempotent() {
    let storage = Storage::in_memory();
    let app = services_at(&storage, Clock::fixed(fixed_now()));
    let body = json!({
        "exam": "JEE",
        "userId": "student-1",
        "progress": {"Physics": {"Gravitation": {"theory": true, "practice": true, "revision": true}}}
    });

    let first = app.progress().save_nested(&body).await.unwrap();
    let tree_once = app.progress().progress(&user(), None).await.unwrap();
    let second = app.progress().save_nested(&body).await.unwrap();
    let tree_twice = app.progress().progress(&user(), None).await.unwrap();

    assert_eq!(tree_once, tree_twice);
    assert_eq!(first.summary, second.summary);
    assert_eq!(second.summary.completed_topics, 1);
    assert_eq!(second.summary.completion_percentage, 100.0);
}

#[tokio::test]
async fn form_with_bad_key_applies_the_rest() {
    let storage = Storage::in_memory();
    let app = services_at(&storage, Clock::fixed(fixed_now()));
    let fields: Vec<(String, String)> = [
        ("exam", "JEE"),
        ("user_id", "student-1"),
        ("BadKey", "true"),
        ("Chemistry__Mole Concept__Theory", "true"),
        ("Chemistry__Mole Concept__Practice", "true"),
        ("Chemistry__Mole Concept__Revision", "true"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v.to_owned()))
    .collect();

    let outcome = app.progress().save_form(&fields).await.unwrap();
    assert_eq!(outcome.applied, 1);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.summary.completed_topics, 1);
}

#[tokio::test]
async fn selecting_neet_seeds_every_topic() {
    let storage = Storage::in_memory();
    let app = services_at(&storage, Clock::fixed(fixed_now()));

    let outcome = app.selection().select(user(), ["NEET"]).await.unwrap();
    assert_eq!(outcome.seeded, 100);
    assert_eq!(outcome.redirect_url, "/tracker/NEET");

    let report = app.statistics().report(&user()).await.unwrap();
    assert_eq!(report.total_topics, 100);
    assert_eq!(report.total_topics_completed, 0);
    assert_eq!(report.total_exams_started, 1);

    let tree = app.progress().progress(&user(), Some("NEET")).await.unwrap();
    assert!(tree.rows().all(|row| row.status() == TopicStatus::default()));
    assert_eq!(
        app.statistics().exam_stats(&user(), "NEET").await.unwrap().total_topics,
        100
    );
}

#[tokio::test]
async fn seeding_keeps_existing_progress() {
    let storage = Storage::in_memory();
    let app = services_at(&storage, Clock::fixed(fixed_now()));
    let body = json!({
        "exam": "NEET",
        "userId": "student-1",
        "progress": {"Biology": {"Evolution": {"theory": true, "practice": true, "revision": true}}}
    });
    app.progress().save_nested(&body).await.unwrap();

    let outcome = app.selection().select(user(), ["NEET"]).await.unwrap();
    assert_eq!(outcome.seeded, 99);
    let stats = app.statistics().exam_stats(&user(), "NEET").await.unwrap();
    assert_eq!(stats.completed_topics, 1);
    assert_eq!(stats.completion_percentage, 1.0);
}

#[tokio::test]
async fn study_session_adds_minutes_and_counts_as_recent() {
    let storage = Storage::in_memory();
    let start = services_at(&storage, Clock::fixed(fixed_now()));
    let id = start
        .sessions()
        .start(StartSession {
            user_id: user(),
            exam: "JEE".into(),
            subject: Some("Physics".into()),
            topic: None,
            session_type: SessionType::Revision,
        })
        .await
        .unwrap();

    let later = services_at(&storage, Clock::fixed(fixed_now() + Duration::minutes(10)));
    let ended = later.sessions().end(id, None).await.unwrap();
    assert_eq!(ended.duration_minutes, 10);

    let report = later.statistics().report(&user()).await.unwrap();
    assert_eq!(report.total_study_time, 10);
    assert_eq!(report.recent_sessions, 1);
    assert_eq!(report.study_streak, 0);
    assert_eq!(report.last_study_date, Some(fixed_now() + Duration::minutes(10)));
}

#[tokio::test]
async fn bulk_sync_across_exams_reports_union() {
    let storage = Storage::in_memory();
    let app = services_at(&storage, Clock::fixed(fixed_now()));
    let done = json!({"theory": true, "practice": true, "revision": true});
    let body = json!({
        "user_id": "student-1",
        "progress": {
            "JEE": {"Physics": {"Gravitation": done.clone(), "Wave Optics": {"theory": true}}},
            "NEET": {"Biology": {"Evolution": done}}
        },
        "settings": {"dark_mode": true}
    });

    let outcome = app.sync().sync(&body).await.unwrap();
    assert_eq!(outcome.applied, 3);
    assert_eq!(outcome.statistics.total_exams_started, 2);
    assert_eq!(outcome.statistics.total_topics, 3);
    assert_eq!(outcome.statistics.total_topics_completed, 2);
    assert_eq!(outcome.statistics.completion_percentage, 66.7);
    assert!(outcome.settings.dark_mode());

    let stored = app.settings().load(&user()).await.unwrap();
    assert!(stored.dark_mode());
}

#[tokio::test]
async fn bad_sync_settings_reject_before_writing() {
    let storage = Storage::in_memory();
    let app = services_at(&storage, Clock::fixed(fixed_now()));
    let body = json!({
        "user_id": "student-1",
        "progress": {"JEE": {"Physics": {"Gravitation": {"theory": true}}}},
        "settings": {"dark_mode": "sometimes"}
    });

    let err = app.sync().sync(&body).await.unwrap_err();
    assert_eq!(err.kind(), services::ServiceErrorKind::Validation);
    assert!(app.progress().progress(&user(), None).await.unwrap().is_empty());
}

#[tokio::test]
async fn non_object_preference_blob_rejects_sync_before_writing() {
    let storage = Storage::in_memory();
    let app = services_at(&storage, Clock::fixed(fixed_now()));
    let body = json!({
        "user_id": "student-1",
        "progress": {"JEE": {"Physics": {"Gravitation": {"theory": true}}}},
        "settings": {"theme_preferences": "dark"}
    });

    let err = app.sync().sync(&body).await.unwrap_err();
    assert_eq!(err.kind(), services::ServiceErrorKind::Validation);
    assert!(app.progress().progress(&user(), None).await.unwrap().is_empty());
    assert_eq!(
        app.settings().load(&user()).await.unwrap(),
        tracker_core::model::UserSettings::default()
    );
}

#[tokio::test]
async fn sqlite_backed_services_share_state() {
    let app = AppServices::new_sqlite(
        "sqlite:file:memdb_services_flow?mode=memory&cache=shared",
        std::time::Duration::from_secs(5),
        Clock::fixed(fixed_now()),
        Arc::new(Catalog::builtin().clone()),
    )
    .await
    .unwrap();

    app.selection().select(user(), ["UGEE", "JEE"]).await.unwrap();
    let current = app.selection().current(&user()).await.unwrap().unwrap();
    assert_eq!(current.selected_exam(), "UGEE");

    let report = app.statistics().report(&user()).await.unwrap();
    assert_eq!(report.total_topics, 122);
    assert_eq!(report.total_exams_started, 2);
}
