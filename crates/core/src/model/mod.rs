mod activity;
mod ids;
mod progress;
mod selection;
mod session;
mod settings;
mod statistics;

pub use ids::{ParseIdError, SessionId, UserId, UserIdError};

pub use activity::{ActivityEntry, ActivityError, RECENT_ACTIVITY_LIMIT};
pub use progress::{
    Category, ProgressTree, StatusParseError, StatusPatch, SubjectProgress, TopicKey,
    TopicKeyError, TopicProgress, TopicProgressView, TopicStatus, parse_status_token,
};
pub use selection::{SelectionError, UserSelection};
pub use session::{NewSession, SessionError, SessionType, StudySession};
pub use settings::{SettingsError, UserSettings, UserSettingsDraft};
pub use statistics::{ExamStats, ProgressSummary, UserStatistics, completion_percentage};
