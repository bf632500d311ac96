//! JSON document backend
//!
//! One document file holding every record, keyed the same way a document
//! database would key them. The whole file is rewritten on each mutation
//! (temp file + rename) so a crash never leaves a half-written document.
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
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    reminders: BTreeMap<String, StoredReminder>,
    #[serde(default)]
    announcements: BTreeMap<String, StoredAnnouncement>,
}

pub struct JsonFileStore {
    path: PathBuf,
    document: Mutex<Option<Document>>,
}

impl JsonFileStore {
    /// Open (or start) the document at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let document = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                Document::default()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            Document::default()
        };

        info!(
            "JSON store ready at {} ({} reminders)",
            path.display(),
            document.reminders.len()
        );
        Ok(Self {
            path,
            document: Mutex::new(Some(document)),
        })
    }

    fn persist(&self, document: &Document) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(document)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl ReminderStore for JsonFileStore {
    async fn create(&self, reminder: &Reminder) -> Result<(), StoreError> {
        let mut guard = self.document.lock().await;
        let document = guard.as_mut().ok_or(StoreError::Closed)?;

        let record = StoredReminder::from(reminder);
        let previous = document.reminders.insert(record.id.clone(), record);
        if let Err(e) = self.persist(document) {
            // keep memory in step with disk
            match previous {
                Some(old) => document.reminders.insert(old.id.clone(), old),
                None => document.reminders.remove(reminder.id.as_str()),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn delete(&self, id: &ReminderId) -> Result<bool, StoreError> {
        let mut guard = self.document.lock().await;
        let document = guard.as_mut().ok_or(StoreError::Closed)?;

        let Some(removed) = document.reminders.remove(id.as_str()) else {
            return Ok(false);
        };
        if let Err(e) = self.persist(document) {
            document.reminders.insert(removed.id.clone(), removed);
            return Err(e);
        }
        Ok(true)
    }

    async fn list_all(&self) -> Result<Vec<Reminder>, StoreError> {
        let guard = self.document.lock().await;
        let document = guard.as_ref().ok_or(StoreError::Closed)?;

        let mut reminders: Vec<Reminder> = document
            .reminders
            .values()
            .cloned()
            .filter_map(|record| match Reminder::try_from(record) {
                Ok(reminder) => Some(reminder),
                Err(e) => {
                    warn!("Skipping unreadable reminder document: {e}");
                    None
                }
            })
            .collect();
        reminders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(reminders)
    }

    async fn close(&self) -> Result<(), StoreError> {
        if self.document.lock().await.take().is_some() {
            info!("JSON store at {} closed", self.path.display());
        }
        Ok(())
    }
}

#[async_trait]
impl AnnouncementStore for JsonFileStore {
    async fn get_announcement(
        &self,
        guild_id: &str,
    ) -> Result<Option<WeeklyAnnouncement>, StoreError> {
        let guard = self.document.lock().await;
        let document = guard.as_ref().ok_or(StoreError::Closed)?;

        document
            .announcements
            .get(guild_id)
            .cloned()
            .map(WeeklyAnnouncement::try_from)
            .transpose()
    }

    async fn put_announcement(&self, announcement: &WeeklyAnnouncement) -> Result<(), StoreError> {
        let mut guard = self.document.lock().await;
        let document = guard.as_mut().ok_or(StoreError::Closed)?;

        let record = StoredAnnouncement::from(announcement);
        let previous = document
            .announcements
            .insert(record.guild_id.clone(), record);
        if let Err(e) = self.persist(document) {
            match previous {
                Some(old) => document.announcements.insert(old.guild_id.clone(), old),
                None => document.announcements.remove(&announcement.guild_id),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn list_announcements(&self) -> Result<Vec<WeeklyAnnouncement>, StoreError> {
        let guard = self.document.lock().await;
        let document = guard.as_ref().ok_or(StoreError::Closed)?;

        Ok(document
            .announcements
            .values()
            .cloned()
            .filter_map(|record| match WeeklyAnnouncement::try_from(record) {
                Ok(announcement) => Some(announcement),
                Err(e) => {
                    warn!("Skipping unreadable announcement document: {e}");
                    None
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn sample(owner: &str, created_min: u32, message: &str) -> Reminder {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, created_min, 0).unwrap();
        Reminder::schedule(owner, None, "321", message, Duration::from_secs(3600), now).unwrap()
    }

    #[tokio::test]
    async fn test_documents_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let first = sample("1", 5, "second created");
        let second = sample("2", 1, "first created");

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.create(&first).await.unwrap();
            store.create(&second).await.unwrap();
            store.close().await.unwrap();
        }

        let store = JsonFileStore::open(&path).unwrap();
        let all = store.list_all().await.unwrap();
        assert_eq!(all, vec![second, first]);
    }

    #[tokio::test]
    async fn test_timestamps_stored_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = JsonFileStore::open(&path).unwrap();
        let reminder = sample("1", 0, "x");
        store.create(&reminder).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let record = &raw["reminders"][reminder.id.as_str()];
        assert_eq!(record["due_at"], "2024-06-01T13:00:00.000Z");
        assert_eq!(record["created_at"], "2024-06-01T12:00:00.000Z");
        assert!(record["target_id"].is_null());
    }

    #[tokio::test]
    async fn test_idempotent_create_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("store.json")).unwrap();
        let reminder = sample("1", 0, "old");
        let mut replay = reminder.clone();
        replay.message = "new".to_string();

        store.create(&reminder).await.unwrap();
        store.create(&replay).await.unwrap();
        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].message, "new");

        assert!(store.delete(&reminder.id).await.unwrap());
        assert!(!store.delete(&reminder.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_closed_store_rejects_operations() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("store.json")).unwrap();
        store.close().await.unwrap();

        assert!(matches!(
            store.create(&sample("1", 0, "x")).await,
            Err(StoreError::Closed)
        ));
        assert!(matches!(
            store.get_announcement("g").await,
            Err(StoreError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_announcements() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("store.json")).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let mut announcement = WeeklyAnnouncement::new("g1", now);
        announcement.message = "reset!".to_string();

        store.put_announcement(&announcement).await.unwrap();
        assert_eq!(
            store.get_announcement("g1").await.unwrap(),
            Some(announcement.clone())
        );
        assert_eq!(store.get_announcement("g2").await.unwrap(), None);
        assert_eq!(store.list_announcements().await.unwrap().len(), 1);
    }
}
