pub mod progress;
pub mod selection;
pub mod syllabus;
pub mod user;
