//! In-memory mirror of every active reminder
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use super::model::{Reminder, ReminderId};
use chrono::{DateTime, Utc};

/// Active reminders in insertion order.
///
/// Owned by the scheduler and only mutated through `add`/`remove`.
#[derive(Debug, Default)]
pub struct ReminderRegistry {
    reminders: Vec<Reminder>,
}

impl ReminderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a store snapshot, oldest first
    pub fn from_reminders(mut reminders: Vec<Reminder>) -> Self {
        reminders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        let mut registry = Self::new();
        for reminder in reminders {
            registry.add(reminder);
        }
        registry
    }

    /// Insert a reminder; an existing entry with the same id is replaced in place
    pub fn add(&mut self, reminder: Reminder) {
        match self.reminders.iter_mut().find(|r| r.id == reminder.id) {
            Some(existing) => *existing = reminder,
            None => self.reminders.push(reminder),
        }
    }

    pub fn remove(&mut self, id: &ReminderId) -> Option<Reminder> {
        let index = self.reminders.iter().position(|r| &r.id == id)?;
        Some(self.reminders.remove(index))
    }

    pub fn get(&self, id: &ReminderId) -> Option<&Reminder> {
        self.reminders.iter().find(|r| &r.id == id)
    }

    pub fn list_by_owner(&self, owner_id: &str) -> Vec<Reminder> {
        self.reminders
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect()
    }

    /// Every reminder with `due_at <= now`
    pub fn due(&self, now: DateTime<Utc>) -> Vec<Reminder> {
        self.reminders
            .iter()
            .filter(|r| r.is_due(now))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.reminders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reminders.is_empty()
    }
}
