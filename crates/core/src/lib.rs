#![forbid(unsafe_code)]

pub mod model;
pub mod syllabus;
pub mod time;

pub use syllabus::Catalog;
pub use time::Clock;
