//! Reminder delivery
//!
//! The scheduler hands due reminders to a [`ReminderNotifier`]; the Discord
//! implementation sends them as a direct-message embed to the recipient.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use super::model::Reminder;
use crate::core::{format_display_time, truncate_for_field, DeliveryError};
use async_trait::async_trait;
use log::debug;
use serenity::builder::CreateEmbed;
use serenity::http::Http;
use serenity::model::id::UserId;
use std::sync::Arc;

/// Embed accent for delivered reminders
pub const REMINDER_COLOR: u32 = 0x3498DB;

/// What the recipient sees when a reminder fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryPayload {
    pub recipient_id: String,
    pub message: String,
    pub due_at: String,
    pub created_by: String,
    pub channel: String,
}

impl DeliveryPayload {
    pub fn from_reminder(reminder: &Reminder) -> Self {
        DeliveryPayload {
            recipient_id: reminder.recipient().to_string(),
            message: truncate_for_field(&reminder.message),
            due_at: format_display_time(reminder.due_at),
            created_by: format!("<@{}>", reminder.owner_id),
            channel: format!("<#{}>", reminder.channel_id),
        }
    }

    /// Embed fields in display order: (name, value, inline)
    pub fn fields(&self) -> Vec<(&'static str, String, bool)> {
        vec![
            ("Message", self.message.clone(), false),
            ("Due", self.due_at.clone(), false),
            ("By", self.created_by.clone(), true),
            ("Channel", self.channel.clone(), true),
        ]
    }

    pub fn embed(&self) -> CreateEmbed {
        let mut embed = CreateEmbed::default();
        embed.title("⏰ Reminder");
        embed.color(REMINDER_COLOR);
        for (name, value, inline) in self.fields() {
            embed.field(name, value, inline);
        }
        embed
    }
}

/// Sends a fired reminder to its recipient
#[async_trait]
pub trait ReminderNotifier: Send + Sync {
    async fn deliver(&self, reminder: &Reminder) -> Result<(), DeliveryError>;
}

/// Delivers reminders as Discord direct messages
pub struct DirectMessageNotifier {
    http: Arc<Http>,
}

impl DirectMessageNotifier {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ReminderNotifier for DirectMessageNotifier {
    async fn deliver(&self, reminder: &Reminder) -> Result<(), DeliveryError> {
        let payload = DeliveryPayload::from_reminder(reminder);
        let user_id = payload
            .recipient_id
            .parse::<u64>()
            .map(UserId)
            .map_err(|_| DeliveryError::InvalidTarget(payload.recipient_id.clone()))?;

        let dm = user_id
            .create_dm_channel(&self.http)
            .await
            .map_err(|e| DeliveryError::Unreachable(format!("open DM with {user_id}: {e}")))?;

        let embed = payload.embed();
        dm.send_message(&self.http, |m| m.set_embed(embed))
            .await
            .map_err(|e| DeliveryError::Unreachable(format!("send DM to {user_id}: {e}")))?;

        debug!("Delivered reminder {} to {}", reminder.id, user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn reminder(target: Option<&str>) -> Reminder {
        let now = Utc.with_ymd_and_hms(2024, 2, 2, 9, 0, 0).unwrap();
        Reminder::schedule(
            "11",
            target.map(String::from),
            "22",
            "check the trading post",
            Duration::from_secs(90),
            now,
        )
        .unwrap()
    }

    #[test]
    fn test_payload_targets_owner_by_default() {
        let payload = DeliveryPayload::from_reminder(&reminder(None));
        assert_eq!(payload.recipient_id, "11");
        assert_eq!(payload.created_by, "<@11>");
        assert_eq!(payload.channel, "<#22>");
        assert_eq!(payload.due_at, "2024-02-02 09:01:30 UTC");
    }

    #[test]
    fn test_payload_targets_explicit_recipient() {
        let payload = DeliveryPayload::from_reminder(&reminder(Some("33")));
        assert_eq!(payload.recipient_id, "33");
        assert_eq!(payload.created_by, "<@11>");
    }

    #[test]
    fn test_fields_order() {
        let payload = DeliveryPayload::from_reminder(&reminder(None));
        let names: Vec<_> = payload.fields().into_iter().map(|(n, _, _)| n).collect();
        assert_eq!(names, vec!["Message", "Due", "By", "Channel"]);
        // CreateEmbed is opaque; building it must not panic
        let _embed = payload.embed();
    }
}
