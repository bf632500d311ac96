//! # Weekly Announcements Feature
//!
//! Per-guild weekly reset announcement posted to a configured channel at a
//! fixed weekday/hour/minute in the bot's announcement timezone.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: true

pub mod model;
pub mod scheduler;

pub use model::{parse_weekday, weekday_name, WeeklyAnnouncement, WEEKDAY_NAMES};
pub use scheduler::{AnnouncementScheduler, Announcer, ChannelAnnouncer};
