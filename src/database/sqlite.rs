//! SQLite backend
//!
//! Timestamps are TEXT (ISO-8601), never SQLite date types.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use super::{AnnouncementStore, ReminderStore};
use crate::core::StoreError;
use crate::features::announcements::model::StoredAnnouncement;
use crate::features::announcements::WeeklyAnnouncement;
use crate::features::reminders::model::StoredReminder;
use crate::features::reminders::{Reminder, ReminderId};
use async_trait::async_trait;
use log::{info, warn};
use sqlite::{Connection, State, Statement};
use std::path::Path;
use tokio::sync::Mutex;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS reminders (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        channel_id TEXT NOT NULL,
        target_id TEXT,
        message TEXT NOT NULL,
        due_at TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_reminders_owner ON reminders(owner_id);
    CREATE INDEX IF NOT EXISTS idx_reminders_due_at ON reminders(due_at);

    CREATE TABLE IF NOT EXISTS weekly_announcements (
        guild_id TEXT PRIMARY KEY,
        channel_id TEXT,
        role_id TEXT,
        day INTEGER NOT NULL,
        hour INTEGER NOT NULL,
        minute INTEGER NOT NULL,
        message TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
"#;

const REMINDER_COLUMNS: &str = "id, owner_id, channel_id, target_id, message, due_at, created_at";
const ANNOUNCEMENT_COLUMNS: &str =
    "guild_id, channel_id, role_id, day, hour, minute, message, created_at, updated_at";

/// Store backed by a single SQLite file (or `:memory:`).
///
/// `None` inside the mutex means the store has been closed.
pub struct SqliteStore {
    conn: Mutex<Option<Connection>>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = sqlite::open(path)?;
        conn.execute(SCHEMA)?;
        info!("SQLite store ready at {}", path.display());
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::open(":memory:")
    }

    fn read_reminder(statement: &Statement<'_>) -> Result<StoredReminder, StoreError> {
        Ok(StoredReminder {
            id: statement.read::<String, _>("id")?,
            owner_id: statement.read::<String, _>("owner_id")?,
            channel_id: statement.read::<String, _>("channel_id")?,
            target_id: statement.read::<Option<String>, _>("target_id")?,
            message: statement.read::<String, _>("message")?,
            due_at: statement.read::<String, _>("due_at")?,
            created_at: statement.read::<String, _>("created_at")?,
        })
    }

    fn read_announcement(statement: &Statement<'_>) -> Result<StoredAnnouncement, StoreError> {
        Ok(StoredAnnouncement {
            guild_id: statement.read::<String, _>("guild_id")?,
            channel_id: statement.read::<Option<String>, _>("channel_id")?,
            role_id: statement.read::<Option<String>, _>("role_id")?,
            day: statement.read::<i64, _>("day")?,
            hour: statement.read::<i64, _>("hour")?,
            minute: statement.read::<i64, _>("minute")?,
            message: statement.read::<String, _>("message")?,
            created_at: statement.read::<String, _>("created_at")?,
            updated_at: statement.read::<String, _>("updated_at")?,
        })
    }
}

#[async_trait]
impl ReminderStore for SqliteStore {
    async fn create(&self, reminder: &Reminder) -> Result<(), StoreError> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        let record = StoredReminder::from(reminder);

        let mut statement = conn.prepare(format!(
            "INSERT OR REPLACE INTO reminders ({REMINDER_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?)"
        ))?;
        statement.bind((1, record.id.as_str()))?;
        statement.bind((2, record.owner_id.as_str()))?;
        statement.bind((3, record.channel_id.as_str()))?;
        statement.bind((4, record.target_id.as_deref()))?;
        statement.bind((5, record.message.as_str()))?;
        statement.bind((6, record.due_at.as_str()))?;
        statement.bind((7, record.created_at.as_str()))?;
        statement.next()?;
        Ok(())
    }

    async fn delete(&self, id: &ReminderId) -> Result<bool, StoreError> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;

        let mut statement = conn.prepare("DELETE FROM reminders WHERE id = ?")?;
        statement.bind((1, id.as_str()))?;
        statement.next()?;
        Ok(conn.change_count() > 0)
    }

    async fn list_all(&self) -> Result<Vec<Reminder>, StoreError> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;

        let mut statement = conn.prepare(format!(
            "SELECT {REMINDER_COLUMNS} FROM reminders ORDER BY created_at, id"
        ))?;
        let mut reminders = Vec::new();
        while let State::Row = statement.next()? {
            match Reminder::try_from(Self::read_reminder(&statement)?) {
                Ok(reminder) => reminders.push(reminder),
                Err(e) => warn!("Skipping unreadable reminder row: {e}"),
            }
        }
        Ok(reminders)
    }

    async fn close(&self) -> Result<(), StoreError> {
        if self.conn.lock().await.take().is_some() {
            info!("SQLite store closed");
        }
        Ok(())
    }
}

#[async_trait]
impl AnnouncementStore for SqliteStore {
    async fn get_announcement(
        &self,
        guild_id: &str,
    ) -> Result<Option<WeeklyAnnouncement>, StoreError> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;

        let mut statement = conn.prepare(format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM weekly_announcements WHERE guild_id = ?"
        ))?;
        statement.bind((1, guild_id))?;
        match statement.next()? {
            State::Row => Ok(Some(WeeklyAnnouncement::try_from(
                Self::read_announcement(&statement)?,
            )?)),
            State::Done => Ok(None),
        }
    }

    async fn put_announcement(&self, announcement: &WeeklyAnnouncement) -> Result<(), StoreError> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        let record = StoredAnnouncement::from(announcement);

        let mut statement = conn.prepare(format!(
            "INSERT OR REPLACE INTO weekly_announcements ({ANNOUNCEMENT_COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))?;
        statement.bind((1, record.guild_id.as_str()))?;
        statement.bind((2, record.channel_id.as_deref()))?;
        statement.bind((3, record.role_id.as_deref()))?;
        statement.bind((4, record.day))?;
        statement.bind((5, record.hour))?;
        statement.bind((6, record.minute))?;
        statement.bind((7, record.message.as_str()))?;
        statement.bind((8, record.created_at.as_str()))?;
        statement.bind((9, record.updated_at.as_str()))?;
        statement.next()?;
        Ok(())
    }

    async fn list_announcements(&self) -> Result<Vec<WeeklyAnnouncement>, StoreError> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;

        let mut statement = conn.prepare(format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM weekly_announcements ORDER BY guild_id"
        ))?;
        let mut announcements = Vec::new();
        while let State::Row = statement.next()? {
            match WeeklyAnnouncement::try_from(Self::read_announcement(&statement)?) {
                Ok(announcement) => announcements.push(announcement),
                Err(e) => warn!("Skipping unreadable announcement row: {e}"),
            }
        }
        Ok(announcements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc, Weekday};
    use std::time::Duration;

    fn sample(owner: &str, after_secs: u64, message: &str) -> Reminder {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        Reminder::schedule(owner, None, "321", message, Duration::from_secs(after_secs), now)
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let store = SqliteStore::in_memory().unwrap();
        let mut reminder = sample("1", 60, "stretch");
        reminder.target_id = Some("2".to_string());

        store.create(&reminder).await.unwrap();
        let all = store.list_all().await.unwrap();

        assert_eq!(all, vec![reminder]);
    }

    #[tokio::test]
    async fn test_create_is_idempotent_latest_wins() {
        let store = SqliteStore::in_memory().unwrap();
        let first = sample("1", 60, "old text");
        let second = sample("1", 60, "new text");
        assert_eq!(first.id, second.id);

        store.create(&first).await.unwrap();
        store.create(&second).await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].message, "new text");
    }

    #[tokio::test]
    async fn test_delete() {
        let store = SqliteStore::in_memory().unwrap();
        let reminder = sample("1", 60, "x");
        store.create(&reminder).await.unwrap();

        assert!(store.delete(&reminder.id).await.unwrap());
        assert!(!store.delete(&reminder.id).await.unwrap());
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reminders.db");
        let reminder = sample("5", 90, "survive restart");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.create(&reminder).await.unwrap();
            store.close().await.unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        let all = reopened.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].due_at, reminder.due_at);
        assert_eq!(all[0].id, reminder.id);
    }

    #[tokio::test]
    async fn test_closed_store_rejects_operations() {
        let store = SqliteStore::in_memory().unwrap();
        store.close().await.unwrap();
        store.close().await.unwrap();

        assert!(matches!(
            store.create(&sample("1", 60, "x")).await,
            Err(StoreError::Closed)
        ));
        assert!(matches!(store.list_all().await, Err(StoreError::Closed)));
    }

    #[tokio::test]
    async fn test_unreadable_rows_are_skipped() {
        let store = SqliteStore::in_memory().unwrap();
        store.create(&sample("1", 60, "good")).await.unwrap();
        {
            let guard = store.conn.lock().await;
            guard
                .as_ref()
                .unwrap()
                .execute(
                    "INSERT INTO reminders VALUES ('bad', '1', '2', NULL, 'm', 'never', 'never')",
                )
                .unwrap();
        }

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].message, "good");
    }

    #[tokio::test]
    async fn test_announcement_upsert() {
        let store = SqliteStore::in_memory().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(store.get_announcement("g1").await.unwrap(), None);

        let mut announcement = WeeklyAnnouncement::new("g1", now);
        announcement.channel_id = Some("c1".to_string());
        store.put_announcement(&announcement).await.unwrap();

        announcement.weekday = Weekday::Fri;
        announcement.role_id = Some("r1".to_string());
        store.put_announcement(&announcement).await.unwrap();

        assert_eq!(
            store.get_announcement("g1").await.unwrap(),
            Some(announcement.clone())
        );
        assert_eq!(store.list_announcements().await.unwrap(), vec![announcement]);
    }
}
