//! # Database Layer
//!
//! Persistence capabilities for reminders and weekly announcements, with one
//! implementation per backend technology. Schedulers only see the traits.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod json_file;
pub mod sqlite;

use crate::core::StoreError;
use crate::features::announcements::WeeklyAnnouncement;
use crate::features::reminders::{Reminder, ReminderId};
use async_trait::async_trait;

pub use json_file::JsonFileStore;
pub use sqlite::SqliteStore;

/// Durable reminder persistence.
///
/// Writes are keyed by the derived reminder id, so `create` is an upsert.
/// Once `close` has run every call fails with [`StoreError::Closed`].
#[async_trait]
pub trait ReminderStore: Send + Sync {
    async fn create(&self, reminder: &Reminder) -> Result<(), StoreError>;

    /// Returns whether a record was actually removed
    async fn delete(&self, id: &ReminderId) -> Result<bool, StoreError>;

    /// Every readable record; unreadable ones are logged and skipped
    async fn list_all(&self) -> Result<Vec<Reminder>, StoreError>;

    async fn close(&self) -> Result<(), StoreError>;
}

/// Per-guild weekly announcement settings
#[async_trait]
pub trait AnnouncementStore: Send + Sync {
    async fn get_announcement(
        &self,
        guild_id: &str,
    ) -> Result<Option<WeeklyAnnouncement>, StoreError>;

    /// Insert or replace the guild's settings
    async fn put_announcement(&self, announcement: &WeeklyAnnouncement) -> Result<(), StoreError>;

    async fn list_announcements(&self) -> Result<Vec<WeeklyAnnouncement>, StoreError>;
}
