// Core layer - shared types and configuration
pub mod core;

// Features layer - reminders and weekly announcements
pub mod features;

// Persistence backends
pub mod database;

// Application layer
pub mod command_handler;
pub mod commands;

// Re-export core config
pub use core::Config;

// Re-export feature items
pub use features::announcements::{AnnouncementScheduler, ChannelAnnouncer, WeeklyAnnouncement};
pub use features::reminders::{DirectMessageNotifier, Reminder, ReminderScheduler};
