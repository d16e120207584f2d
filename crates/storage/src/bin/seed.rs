use std::fmt;

use chrono::{DateTime, Duration, Utc};
use storage::repository::Storage;
use tracker_core::Catalog;
use tracker_core::model::{
    NewSession, ProgressSummary, SessionType, TopicProgress, TopicStatus, UserId, UserSelection,
};
use tracker_core::time::elapsed_minutes;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    user_id: UserId,
    exam: String,
    completed: u32,
    sessions: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidUser { raw: String },
    InvalidCompleted { raw: String },
    InvalidSessions { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidUser { raw } => write!(f, "invalid --user value: {raw:?}"),
            ArgsError::InvalidCompleted { raw } => write!(f, "invalid --completed value: {raw}"),
            ArgsError::InvalidSessions { raw } => write!(f, "invalid --sessions value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_user(raw: String) -> Result<UserId, ArgsError> {
    UserId::new(raw.clone()).map_err(|_| ArgsError::InvalidUser { raw })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://tracker.sqlite3".into());
        let mut user_id = parse_user(
            std::env::var("SEED_USER_ID").unwrap_or_else(|_| "demo-student".into()),
        )?;
        let mut exam = std::env::var("SEED_EXAM").unwrap_or_else(|_| "JEE".into());
        let mut completed = 5;
        let mut sessions = 3;
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--user" => {
                    user_id = parse_user(require_value(&mut args, "--user")?)?;
                }
                "--exam" => {
                    exam = require_value(&mut args, "--exam")?;
                }
                "--completed" => {
                    let value = require_value(&mut args, "--completed")?;
                    completed = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidCompleted { raw: value.clone() })?;
                }
                "--sessions" => {
                    let value = require_value(&mut args, "--sessions")?;
                    sessions = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidSessions { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            user_id,
            exam,
            completed,
            sessions,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite://tracker.sqlite3)");
    eprintln!("  --user <id>               User to seed (default: demo-student)");
    eprintln!("  --exam <name>             Built-in exam to select (default: JEE)");
    eprintln!("  --completed <n>           Topics to mark fully complete (default: 5)");
    eprintln!("  --sessions <n>            Finished 30-minute study sessions (default: 3)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment: DATABASE_URL, SEED_USER_ID, SEED_EXAM");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let catalog = Catalog::builtin();
    let syllabus = catalog
        .exam(&args.exam)
        .ok_or_else(|| format!("unknown exam: {}", args.exam))?;
    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let selection = UserSelection::new(args.user_id.clone(), [args.exam.as_str()], now)?;
    storage.selections.save_selection(&selection).await?;

    let mut marked = 0_u32;
    for key in syllabus.topic_keys()? {
        if marked < args.completed {
            let row = TopicProgress::record(key, TopicStatus::all_done(), now);
            storage.progress.upsert_topic(&args.user_id, &row).await?;
            marked += 1;
        } else {
            storage.progress.seed_topic(&args.user_id, &key).await?;
        }
    }

    let tree = storage.progress.get_progress(&args.user_id, None).await?;
    storage
        .statistics
        .record_progress_counts(&args.user_id, &ProgressSummary::from_tree(&tree))
        .await?;

    for i in 0..args.sessions {
        let started_at = now - Duration::days(i64::from(i)) - Duration::minutes(30);
        let new = NewSession::new(
            args.user_id.clone(),
            args.exam.clone(),
            None,
            None,
            SessionType::Study,
            started_at,
        )?;
        let id = storage.sessions.insert_session(&new).await?;
        if let Some(mut session) = storage.sessions.get_session(id).await? {
            let ended_at = started_at + Duration::minutes(30);
            session.finish(ended_at, None)?;
            storage.sessions.finish_session(&session).await?;
            storage
                .statistics
                .add_study_time(&args.user_id, elapsed_minutes(started_at, ended_at), ended_at)
                .await?;
        }
    }

    println!(
        "Seeded {} for {} with {} completed topics and {} sessions into {}",
        args.exam, args.user_id, marked, args.sessions, args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
