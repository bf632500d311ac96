//! Shared context for command handlers
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::features::announcements::AnnouncementScheduler;
use crate::features::reminders::ReminderScheduler;
use std::sync::Arc;

/// Shared context for all command handlers
///
/// Holds the services handlers act on:
/// - ReminderScheduler for reminder creation, listing and cancellation
/// - AnnouncementScheduler for weekly announcement settings
/// - The command prefix, for usage hints
/// - Bot start time for uptime reporting
#[derive(Clone)]
pub struct CommandContext {
    pub reminders: Arc<ReminderScheduler>,
    pub announcements: Arc<AnnouncementScheduler>,
    pub prefix: String,
    pub start_time: std::time::Instant,
}

impl CommandContext {
    pub fn new(
        reminders: Arc<ReminderScheduler>,
        announcements: Arc<AnnouncementScheduler>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            reminders,
            announcements,
            prefix: prefix.into(),
            start_time: std::time::Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_context_clone() {
        // CommandContext should be Clone for sharing across handlers
        fn assert_clone<T: Clone>() {}
        assert_clone::<CommandContext>();
    }
}
