//! Weekly announcement slot configuration
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::core::{StoreError, ValidationError};
use crate::features::reminders::model::{from_iso, to_iso};
use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MESSAGE: &str = "The week resets today. Don't forget your weekly purchases!";
pub const DEFAULT_HOUR: u32 = 2;
pub const DEFAULT_MINUTE: u32 = 0;

/// Day names accepted by `setday`, in display order
pub const WEEKDAY_NAMES: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Parse an English or Spanish day name
pub fn parse_weekday(name: &str) -> Result<Weekday, ValidationError> {
    match name.trim().to_lowercase().as_str() {
        "monday" | "mon" | "lunes" => Ok(Weekday::Mon),
        "tuesday" | "tue" | "martes" => Ok(Weekday::Tue),
        "wednesday" | "wed" | "miercoles" | "miércoles" => Ok(Weekday::Wed),
        "thursday" | "thu" | "jueves" => Ok(Weekday::Thu),
        "friday" | "fri" | "viernes" => Ok(Weekday::Fri),
        "saturday" | "sat" | "sabado" | "sábado" => Ok(Weekday::Sat),
        "sunday" | "sun" | "domingo" => Ok(Weekday::Sun),
        other => Err(ValidationError::InvalidWeekday(other.to_string())),
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAY_NAMES[day.num_days_from_monday() as usize]
}

fn weekday_from_index(index: i64) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Mon),
        1 => Some(Weekday::Tue),
        2 => Some(Weekday::Wed),
        3 => Some(Weekday::Thu),
        4 => Some(Weekday::Fri),
        5 => Some(Weekday::Sat),
        6 => Some(Weekday::Sun),
        _ => None,
    }
}

/// One guild's weekly announcement: a single fixed weekday/hour/minute slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyAnnouncement {
    pub guild_id: String,
    pub channel_id: Option<String>,
    pub role_id: Option<String>,
    pub weekday: Weekday,
    pub hour: u32,
    pub minute: u32,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WeeklyAnnouncement {
    pub fn new(guild_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        WeeklyAnnouncement {
            guild_id: guild_id.into(),
            channel_id: None,
            role_id: None,
            weekday: Weekday::Mon,
            hour: DEFAULT_HOUR,
            minute: DEFAULT_MINUTE,
            message: DEFAULT_MESSAGE.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_time(&mut self, hour: u32, minute: u32) -> Result<(), ValidationError> {
        if hour > 23 || minute > 59 {
            return Err(ValidationError::InvalidTimeOfDay);
        }
        self.hour = hour;
        self.minute = minute;
        Ok(())
    }

    /// Whether local wall-clock time falls inside this slot's minute
    pub fn matches(&self, local: NaiveDateTime) -> bool {
        local.weekday() == self.weekday && local.hour() == self.hour && local.minute() == self.minute
    }

    /// Text posted to the announcement channel
    pub fn content(&self) -> String {
        match &self.role_id {
            Some(role) => format!("{} <@&{}>", self.message, role),
            None => self.message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAnnouncement {
    pub guild_id: String,
    pub channel_id: Option<String>,
    pub role_id: Option<String>,
    /// 0 = Monday
    pub day: i64,
    pub hour: i64,
    pub minute: i64,
    pub message: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&WeeklyAnnouncement> for StoredAnnouncement {
    fn from(a: &WeeklyAnnouncement) -> Self {
        StoredAnnouncement {
            guild_id: a.guild_id.clone(),
            channel_id: a.channel_id.clone(),
            role_id: a.role_id.clone(),
            day: i64::from(a.weekday.num_days_from_monday()),
            hour: i64::from(a.hour),
            minute: i64::from(a.minute),
            message: a.message.clone(),
            created_at: to_iso(a.created_at),
            updated_at: to_iso(a.updated_at),
        }
    }
}

impl TryFrom<StoredAnnouncement> for WeeklyAnnouncement {
    type Error = StoreError;

    fn try_from(stored: StoredAnnouncement) -> Result<Self, StoreError> {
        let corrupt = |reason: String| StoreError::Corrupt {
            id: stored.guild_id.clone(),
            reason,
        };
        let weekday =
            weekday_from_index(stored.day).ok_or_else(|| corrupt(format!("day {}", stored.day)))?;
        let hour = u32::try_from(stored.hour)
            .ok()
            .filter(|h| *h <= 23)
            .ok_or_else(|| corrupt(format!("hour {}", stored.hour)))?;
        let minute = u32::try_from(stored.minute)
            .ok()
            .filter(|m| *m <= 59)
            .ok_or_else(|| corrupt(format!("minute {}", stored.minute)))?;
        let created_at = from_iso(&stored.guild_id, "created_at", &stored.created_at)?;
        let updated_at = from_iso(&stored.guild_id, "updated_at", &stored.updated_at)?;

        Ok(WeeklyAnnouncement {
            guild_id: stored.guild_id,
            channel_id: stored.channel_id,
            role_id: stored.role_id,
            weekday,
            hour,
            minute,
            message: stored.message,
            created_at,
            updated_at,
        })
    }
}
