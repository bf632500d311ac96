//! Weekly announcement settings and sweep loop
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use super::model::WeeklyAnnouncement;
use crate::core::{DeliveryError, ReminderError, StoreError, ValidationError};
use crate::database::AnnouncementStore;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;
use dashmap::DashMap;
use log::{debug, error, info, warn};
use serenity::http::Http;
use serenity::model::id::ChannelId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Posts announcement text to a channel
#[async_trait]
pub trait Announcer: Send + Sync {
    async fn announce(&self, channel_id: &str, content: &str) -> Result<(), DeliveryError>;
}

pub struct ChannelAnnouncer {
    http: Arc<Http>,
}

impl ChannelAnnouncer {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Announcer for ChannelAnnouncer {
    async fn announce(&self, channel_id: &str, content: &str) -> Result<(), DeliveryError> {
        let channel = channel_id
            .parse::<u64>()
            .map(ChannelId)
            .map_err(|_| DeliveryError::InvalidTarget(channel_id.to_string()))?;
        channel
            .say(&self.http, content)
            .await
            .map_err(|e| DeliveryError::Unreachable(format!("channel {channel}: {e}")))?;
        Ok(())
    }
}

pub struct AnnouncementScheduler {
    store: Arc<dyn AnnouncementStore>,
    timezone: Tz,
    tick: Duration,
    /// Last slot (local minute) each guild fired in
    last_fired: DashMap<String, NaiveDateTime>,
}

impl AnnouncementScheduler {
    pub fn new(store: Arc<dyn AnnouncementStore>, timezone: Tz, tick: Duration) -> Self {
        Self {
            store,
            timezone,
            tick,
            last_fired: DashMap::new(),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub async fn get(&self, guild_id: &str) -> Result<Option<WeeklyAnnouncement>, StoreError> {
        self.store.get_announcement(guild_id).await
    }

    /// Load the guild's settings (or defaults), apply `update`, save
    pub async fn configure<F>(
        &self,
        guild_id: &str,
        now: DateTime<Utc>,
        update: F,
    ) -> Result<WeeklyAnnouncement, ReminderError>
    where
        F: FnOnce(&mut WeeklyAnnouncement) -> Result<(), ValidationError> + Send,
    {
        let mut announcement = self
            .store
            .get_announcement(guild_id)
            .await?
            .unwrap_or_else(|| WeeklyAnnouncement::new(guild_id, now));

        update(&mut announcement)?;
        announcement.updated_at = now;

        self.store.put_announcement(&announcement).await?;
        info!("Updated weekly announcement for guild {guild_id}");
        Ok(announcement)
    }

    /// Post every announcement whose slot contains `now`; returns how many were posted.
    ///
    /// A guild fires at most once per slot no matter how many ticks land in it.
    pub async fn sweep(&self, now: DateTime<Utc>, announcer: &dyn Announcer) -> usize {
        let announcements = match self.store.list_announcements().await {
            Ok(list) => list,
            Err(e) => {
                error!("Failed to load weekly announcements: {e}");
                return 0;
            }
        };

        let local = now.with_timezone(&self.timezone).naive_local();
        let slot = local
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(local);
        let mut posted = 0;

        for announcement in announcements {
            if !announcement.matches(local) {
                continue;
            }
            let Some(channel_id) = announcement.channel_id.as_deref() else {
                debug!(
                    "Guild {} announcement due but no channel configured",
                    announcement.guild_id
                );
                continue;
            };
            if self
                .last_fired
                .get(&announcement.guild_id)
                .is_some_and(|fired| *fired == slot)
            {
                continue;
            }
            self.last_fired.insert(announcement.guild_id.clone(), slot);

            match announcer.announce(channel_id, &announcement.content()).await {
                Ok(()) => {
                    info!(
                        "Posted weekly announcement for guild {} in {channel_id}",
                        announcement.guild_id
                    );
                    posted += 1;
                }
                Err(e) => warn!(
                    "Failed to post weekly announcement for guild {}: {e}",
                    announcement.guild_id
                ),
            }
        }

        posted
    }

    pub async fn run(self: Arc<Self>, announcer: Arc<dyn Announcer>, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            "Weekly announcement scheduler started (interval: {}s, timezone: {})",
            self.tick.as_secs(),
            self.timezone
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.sweep(Utc::now(), announcer.as_ref()).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Weekly announcement scheduler stopped");
    }
}
