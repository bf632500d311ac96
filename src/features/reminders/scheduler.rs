//! Reminder scheduler: creation, cancellation and the periodic sweep
//!
//! Every mutation goes to the store first and the in-memory registry second,
//! except the sweep, which always drops fired reminders from the registry so
//! a failed store delete can never make a reminder fire twice in this process.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use super::command::ReminderRequest;
use super::delivery::ReminderNotifier;
use super::model::Reminder;
use super::registry::ReminderRegistry;
use crate::core::{ReminderError, StoreError, ValidationError};
use crate::database::ReminderStore;
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::time::MissedTickBehavior;

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Reminders taken out of the schedule this tick
    pub fired: usize,
    pub delivery_failures: usize,
    pub store_failures: usize,
}

/// Outcome of `removeall`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkRemoval {
    pub removed: usize,
    pub failed: usize,
}

pub struct ReminderScheduler {
    store: Arc<dyn ReminderStore>,
    registry: RwLock<ReminderRegistry>,
    tick: Duration,
}

impl ReminderScheduler {
    /// Rebuild the registry from the store and get ready to sweep
    pub async fn load(store: Arc<dyn ReminderStore>, tick: Duration) -> Result<Self, StoreError> {
        let reminders = store.list_all().await?;
        info!("Loaded {} pending reminders from store", reminders.len());
        Ok(Self {
            store,
            registry: RwLock::new(ReminderRegistry::from_reminders(reminders)),
            tick,
        })
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Schedule a parsed request on behalf of `owner_id`
    pub async fn create(
        &self,
        owner_id: &str,
        request: ReminderRequest,
        now: DateTime<Utc>,
    ) -> Result<Reminder, ReminderError> {
        let reminder = Reminder::schedule(
            owner_id,
            request.target_id,
            request.channel_id,
            request.message,
            request.duration,
            now,
        )?;

        self.store.create(&reminder).await.map_err(|e| {
            error!("Failed to save reminder {} for user {owner_id}: {e}", reminder.id);
            e
        })?;
        self.registry.write().await.add(reminder.clone());

        info!(
            "Created reminder {} for user {} (target {}) due {}",
            reminder.id,
            owner_id,
            reminder.recipient(),
            reminder.due_at
        );
        Ok(reminder)
    }

    /// The owner's reminders, oldest first
    pub async fn list_for_owner(&self, owner_id: &str) -> Vec<Reminder> {
        self.registry.read().await.list_by_owner(owner_id)
    }

    pub async fn pending_count(&self) -> usize {
        self.registry.read().await.len()
    }

    /// Cancel the owner's `index`-th reminder (1-based, as listed)
    pub async fn remove_at(&self, owner_id: &str, index: i64) -> Result<Reminder, ReminderError> {
        let reminders = self.list_for_owner(owner_id).await;
        let reminder = usize::try_from(index)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| reminders.get(i))
            .cloned()
            .ok_or(ValidationError::InvalidIndex)?;

        self.cancel(&reminder).await?;
        info!("User {owner_id} cancelled reminder #{index} ({})", reminder.id);
        Ok(reminder)
    }

    /// Cancel every reminder the owner has
    pub async fn remove_all(&self, owner_id: &str) -> BulkRemoval {
        let mut result = BulkRemoval::default();
        for reminder in self.list_for_owner(owner_id).await {
            match self.cancel(&reminder).await {
                Ok(()) => result.removed += 1,
                Err(e) => {
                    warn!("Could not delete reminder {} for {owner_id}: {e}", reminder.id);
                    result.failed += 1;
                }
            }
        }
        info!(
            "User {owner_id} cleared reminders: {} removed, {} failed",
            result.removed, result.failed
        );
        result
    }

    async fn cancel(&self, reminder: &Reminder) -> Result<(), StoreError> {
        self.store.delete(&reminder.id).await?;
        self.registry.write().await.remove(&reminder.id);
        Ok(())
    }

    /// Fire and retire everything due at `now` (inclusive).
    ///
    /// Delivery is attempted once; whatever the outcome the reminder leaves
    /// both registry and store.
    pub async fn sweep(&self, now: DateTime<Utc>, notifier: &dyn ReminderNotifier) -> SweepReport {
        let due = self.registry.read().await.due(now);
        let mut report = SweepReport::default();

        for reminder in due {
            if let Err(e) = notifier.deliver(&reminder).await {
                warn!(
                    "Failed to deliver reminder {} to {}: {e}",
                    reminder.id,
                    reminder.recipient()
                );
                report.delivery_failures += 1;
            } else {
                info!("Fired reminder {} for {}", reminder.id, reminder.recipient());
            }

            self.registry.write().await.remove(&reminder.id);
            if let Err(e) = self.store.delete(&reminder.id).await {
                error!("Failed to delete fired reminder {} from store: {e}", reminder.id);
                report.store_failures += 1;
            }
            report.fired += 1;
        }

        report
    }

    /// Sweep every tick until `shutdown` flips to true or its sender is dropped.
    ///
    /// Shutdown is only observed between sweeps.
    pub async fn run(
        self: Arc<Self>,
        notifier: Arc<dyn ReminderNotifier>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            "Reminder scheduler started (interval: {}s)",
            self.tick.as_secs()
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let report = self.sweep(Utc::now(), notifier.as_ref()).await;
                    if report.fired > 0 {
                        info!(
                            "Reminder sweep: {} fired, {} undeliverable, {} store errors",
                            report.fired, report.delivery_failures, report.store_failures
                        );
                    } else {
                        debug!("Reminder sweep: nothing due");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Reminder scheduler stopped");
    }
}
