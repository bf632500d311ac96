//! # Configuration
//!
//! Environment-driven bot configuration. `.env` is loaded by the binary
//! before [`Config::from_env`] runs.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use std::time::Duration;

/// Which persistence backend reminders and announcements live in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Json,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "json" => Ok(StorageBackend::Json),
            other => Err(anyhow!("Invalid storage backend: {other} (expected sqlite or json)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub command_prefix: String,
    pub log_level: String,
    pub storage_backend: StorageBackend,
    pub database_path: String,
    pub json_store_path: String,
    pub reminder_tick: Duration,
    pub announcement_tick: Duration,
    pub announcement_timezone: Tz,
    pub bot_activity: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| anyhow!("DISCORD_TOKEN must be set"))?;

        let command_prefix = get("COMMAND_PREFIX", ".");
        if command_prefix.trim().is_empty() {
            return Err(anyhow!("COMMAND_PREFIX must not be empty"));
        }

        let storage_backend = get("STORAGE_BACKEND", "sqlite").parse()?;

        let announcement_timezone = get("ANNOUNCEMENT_TIMEZONE", "America/Bogota")
            .parse::<Tz>()
            .map_err(|e| anyhow!("Invalid ANNOUNCEMENT_TIMEZONE: {e}"))?;

        Ok(Config {
            discord_token,
            command_prefix,
            log_level: get("LOG_LEVEL", "info"),
            storage_backend,
            database_path: get("DATABASE_PATH", "kunzeu.db"),
            json_store_path: get("JSON_STORE_PATH", "kunzeu.json"),
            reminder_tick: parse_tick(&get("REMINDER_TICK_SECONDS", "30"), "REMINDER_TICK_SECONDS")?,
            announcement_tick: parse_tick(
                &get("ANNOUNCEMENT_TICK_SECONDS", "60"),
                "ANNOUNCEMENT_TICK_SECONDS",
            )?,
            announcement_timezone,
            bot_activity: get("BOT_ACTIVITY", "Guild Wars 2"),
        })
    }
}

fn parse_tick(value: &str, name: &str) -> Result<Duration> {
    let secs: u64 = value
        .trim()
        .parse()
        .with_context(|| format!("{name} must be a whole number of seconds"))?;
    if secs == 0 {
        return Err(anyhow!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("DISCORD_TOKEN", "abc")])).unwrap();

        assert_eq!(config.command_prefix, ".");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.storage_backend, StorageBackend::Sqlite);
        assert_eq!(config.reminder_tick, Duration::from_secs(30));
        assert_eq!(config.announcement_tick, Duration::from_secs(60));
        assert_eq!(config.announcement_timezone, chrono_tz::America::Bogota);
        assert_eq!(config.bot_activity, "Guild Wars 2");
    }

    #[test]
    fn test_missing_token() {
        assert!(Config::from_lookup(lookup_from(&[])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("DISCORD_TOKEN", "  ")])).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("COMMAND_PREFIX", "!"),
            ("STORAGE_BACKEND", "JSON"),
            ("REMINDER_TICK_SECONDS", "5"),
            ("ANNOUNCEMENT_TIMEZONE", "Europe/Madrid"),
        ]))
        .unwrap();

        assert_eq!(config.command_prefix, "!");
        assert_eq!(config.storage_backend, StorageBackend::Json);
        assert_eq!(config.reminder_tick, Duration::from_secs(5));
        assert_eq!(config.announcement_timezone, chrono_tz::Europe::Madrid);
    }

    #[test]
    fn test_invalid_values() {
        let with = |key: &'static str, value: &'static str| {
            Config::from_lookup(lookup_from(&[("DISCORD_TOKEN", "abc"), (key, value)]))
        };

        assert!(with("REMINDER_TICK_SECONDS", "0").is_err());
        assert!(with("ANNOUNCEMENT_TICK_SECONDS", "soon").is_err());
        assert!(with("STORAGE_BACKEND", "firestore").is_err());
        assert!(with("ANNOUNCEMENT_TIMEZONE", "Mars/Olympus").is_err());
    }
}
