//! Reminder records and their persisted shape
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::core::{StoreError, ValidationError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Storage key derived from (owner, due time).
///
/// Re-creating the same owner/due pair yields the same id, so a replayed
/// write overwrites instead of duplicating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReminderId(String);

impl ReminderId {
    pub fn derive(owner_id: &str, due_at: DateTime<Utc>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(owner_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(due_at.timestamp().to_be_bytes());
        let hex = format!("{:x}", hasher.finalize());
        ReminderId(hex[..32].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReminderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A pending one-shot notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub id: ReminderId,

    /// User who created the reminder
    pub owner_id: String,

    /// User to notify; `None` means the owner
    pub target_id: Option<String>,

    /// Channel the reminder was created from or pointed at (display only)
    pub channel_id: String,

    pub message: String,

    pub due_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
}

impl Reminder {
    /// Build a reminder due `after` from `now`.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MessageRequired`] for a blank message,
    /// [`ValidationError::InvalidTimeFormat`] for a zero or unrepresentable offset.
    pub fn schedule(
        owner_id: impl Into<String>,
        target_id: Option<String>,
        channel_id: impl Into<String>,
        message: impl Into<String>,
        after: Duration,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ValidationError::MessageRequired);
        }
        if after.is_zero() {
            return Err(ValidationError::InvalidTimeFormat);
        }

        let due_at = chrono::Duration::from_std(after)
            .ok()
            .and_then(|offset| now.checked_add_signed(offset))
            .ok_or(ValidationError::InvalidTimeFormat)?;

        let owner_id = owner_id.into();
        Ok(Reminder {
            id: ReminderId::derive(&owner_id, due_at),
            owner_id,
            target_id,
            channel_id: channel_id.into(),
            message,
            due_at,
            created_at: now,
        })
    }

    /// Who the notification goes to
    pub fn recipient(&self) -> &str {
        self.target_id.as_deref().unwrap_or(&self.owner_id)
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_at <= now
    }
}

/// Backend-agnostic record: every timestamp is ISO-8601 text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredReminder {
    pub id: String,
    pub owner_id: String,
    pub channel_id: String,
    pub target_id: Option<String>,
    pub message: String,
    pub due_at: String,
    pub created_at: String,
}

/// RFC3339 with milliseconds; fixed width, so text order is time order
pub(crate) fn to_iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn from_iso(id: &str, field: &str, value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt {
            id: id.to_string(),
            reason: format!("{field} {value:?}: {e}"),
        })
}

impl From<&Reminder> for StoredReminder {
    fn from(reminder: &Reminder) -> Self {
        StoredReminder {
            id: reminder.id.as_str().to_string(),
            owner_id: reminder.owner_id.clone(),
            channel_id: reminder.channel_id.clone(),
            target_id: reminder.target_id.clone(),
            message: reminder.message.clone(),
            due_at: to_iso(reminder.due_at),
            created_at: to_iso(reminder.created_at),
        }
    }
}

impl TryFrom<StoredReminder> for Reminder {
    type Error = StoreError;

    fn try_from(stored: StoredReminder) -> Result<Self, StoreError> {
        let due_at = from_iso(&stored.id, "due_at", &stored.due_at)?;
        let created_at = from_iso(&stored.id, "created_at", &stored.created_at)?;
        Ok(Reminder {
            id: ReminderId(stored.id),
            owner_id: stored.owner_id,
            target_id: stored.target_id,
            channel_id: stored.channel_id,
            message: stored.message,
            due_at,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, h, m, s).unwrap()
    }

    #[test]
    fn test_due_at_is_now_plus_duration() {
        let now = at(10, 0, 0) + chrono::Duration::milliseconds(250);
        let reminder =
            Reminder::schedule("1", None, "9", "buy milk", Duration::from_secs(600), now).unwrap();

        assert_eq!(reminder.due_at, now + chrono::Duration::seconds(600));
        assert_eq!(reminder.created_at, now);
        assert_eq!(reminder.recipient(), "1");
    }

    #[test]
    fn test_rejects_empty_message_and_zero_duration() {
        let now = at(10, 0, 0);
        assert_eq!(
            Reminder::schedule("1", None, "9", "  ", Duration::from_secs(60), now),
            Err(ValidationError::MessageRequired)
        );
        assert_eq!(
            Reminder::schedule("1", None, "9", "hi", Duration::ZERO, now),
            Err(ValidationError::InvalidTimeFormat)
        );
    }

    #[test]
    fn test_derived_id_is_deterministic() {
        let due = at(12, 0, 0);
        assert_eq!(ReminderId::derive("42", due), ReminderId::derive("42", due));
        assert_ne!(ReminderId::derive("42", due), ReminderId::derive("43", due));
        assert_ne!(
            ReminderId::derive("42", due),
            ReminderId::derive("42", due + chrono::Duration::seconds(1))
        );
        assert_eq!(ReminderId::derive("42", due).as_str().len(), 32);
    }

    #[test]
    fn test_target_overrides_recipient() {
        let reminder = Reminder::schedule(
            "1",
            Some("2".to_string()),
            "9",
            "ping",
            Duration::from_secs(60),
            at(10, 0, 0),
        )
        .unwrap();
        assert_eq!(reminder.recipient(), "2");
    }

    #[test]
    fn test_stored_record_keeps_millisecond_precision() {
        let now = at(8, 15, 30) + chrono::Duration::milliseconds(900);
        let reminder =
            Reminder::schedule("7", None, "9", "stretch", Duration::from_secs(3600), now).unwrap();

        let stored = StoredReminder::from(&reminder);
        assert_eq!(stored.due_at, "2024-03-10T09:15:30.900Z");
        assert_eq!(stored.created_at, "2024-03-10T08:15:30.900Z");
        assert_eq!(stored.target_id, None);

        let restored = Reminder::try_from(stored).unwrap();
        assert_eq!(restored, reminder);
    }

    #[test]
    fn test_second_precision_records_still_load() {
        let stored = StoredReminder {
            id: "abc".to_string(),
            owner_id: "1".to_string(),
            channel_id: "2".to_string(),
            target_id: None,
            message: "x".to_string(),
            due_at: "2024-03-10T10:15:30Z".to_string(),
            created_at: "2024-03-10T09:15:30Z".to_string(),
        };
        let restored = Reminder::try_from(stored).unwrap();
        assert_eq!(restored.created_at, at(9, 15, 30));
    }

    #[test]
    fn test_corrupt_timestamp() {
        let stored = StoredReminder {
            id: "abc".to_string(),
            owner_id: "1".to_string(),
            channel_id: "2".to_string(),
            target_id: None,
            message: "x".to_string(),
            due_at: "tomorrow".to_string(),
            created_at: "2024-03-10T09:15:30Z".to_string(),
        };
        assert!(matches!(
            Reminder::try_from(stored),
            Err(StoreError::Corrupt { .. })
        ));
    }
}
