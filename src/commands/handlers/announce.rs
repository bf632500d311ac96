//! Weekly announcement command handlers
//!
//! Handles: setchannel, setrole, setday, settime, setmessage, announceconfig
//!
//! All commands are guild-only and require the Administrator permission.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Utc, Weekday};
use log::{debug, warn};
use regex::Regex;
use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::model::id::GuildId;
use serenity::prelude::Context;
use std::sync::OnceLock;

use crate::commands::context::CommandContext;
use crate::commands::handler::{Invocation, TextCommandHandler};
use crate::core::{truncate_for_field, ReminderError, ValidationError};
use crate::features::announcements::{parse_weekday, weekday_name, WeeklyAnnouncement};
use std::sync::Arc;

const CONFIG_COLOR: u32 = 0x3498DB;

pub const GUILD_ONLY: &str = "❌ This command can only be used in a server.";
pub const ADMIN_ONLY: &str = "❌ You need the Administrator permission to use this command.";
pub const SAVE_FAILED: &str = "❌ There was an error saving the announcement settings.";
pub const NOT_CONFIGURED: &str = "❌ No announcement is configured for this server.";

/// Handler for weekly announcement settings
pub struct AnnounceHandler;

#[async_trait]
impl TextCommandHandler for AnnounceHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &[
            "setchannel",
            "setrole",
            "setday",
            "settime",
            "setmessage",
            "announceconfig",
        ]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        msg: &Message,
        invocation: &Invocation,
    ) -> Result<()> {
        let Some(guild_id) = msg.guild_id else {
            msg.channel_id.say(&serenity_ctx.http, GUILD_ONLY).await?;
            return Ok(());
        };

        if !self.is_admin(serenity_ctx, guild_id, msg).await? {
            debug!(
                "[{}] {} denied: {} is not an administrator",
                invocation.request_id, invocation.name, msg.author.id
            );
            msg.channel_id.say(&serenity_ctx.http, ADMIN_ONLY).await?;
            return Ok(());
        }

        if invocation.name == "announceconfig" {
            return self.handle_config(&ctx, serenity_ctx, msg, guild_id).await;
        }

        let reply = match self.apply(&ctx, msg, guild_id, invocation).await {
            Ok(reply) => reply,
            Err(ReminderError::Store(e)) => {
                warn!(
                    "[{}] Failed to save announcement settings for guild {guild_id}: {e}",
                    invocation.request_id
                );
                SAVE_FAILED.to_string()
            }
            Err(e) => format!("❌ {}", e.user_message()),
        };
        msg.channel_id.say(&serenity_ctx.http, reply).await?;
        Ok(())
    }
}

impl AnnounceHandler {
    async fn is_admin(&self, serenity_ctx: &Context, guild_id: GuildId, msg: &Message) -> Result<bool> {
        let member = guild_id.member(serenity_ctx, msg.author.id).await?;
        let permissions = member.permissions(serenity_ctx)?;
        Ok(permissions.administrator())
    }

    /// Run one setter command; returns the confirmation text
    async fn apply(
        &self,
        ctx: &CommandContext,
        msg: &Message,
        guild_id: GuildId,
        invocation: &Invocation,
    ) -> Result<String, ReminderError> {
        let setting = parse_setting(
            &invocation.name,
            &invocation.args,
            &msg.channel_id.to_string(),
        )?;
        let reply = setting.confirmation();
        ctx.announcements
            .configure(&guild_id.to_string(), Utc::now(), move |a| setting.apply(a))
            .await?;
        Ok(reply)
    }

    /// Handle .announceconfig - show the current settings
    async fn handle_config(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        msg: &Message,
        guild_id: GuildId,
    ) -> Result<()> {
        let announcement = match ctx.announcements.get(&guild_id.to_string()).await {
            Ok(Some(announcement)) => announcement,
            Ok(None) => {
                msg.channel_id.say(&serenity_ctx.http, NOT_CONFIGURED).await?;
                return Ok(());
            }
            Err(e) => {
                warn!("Failed to load announcement settings for guild {guild_id}: {e}");
                msg.channel_id
                    .say(&serenity_ctx.http, "❌ Could not load the announcement settings.")
                    .await?;
                return Ok(());
            }
        };

        let mut embed = CreateEmbed::default();
        embed.title("📅 Weekly Announcement");
        embed.color(CONFIG_COLOR);
        for (name, value) in config_fields(&announcement, &ctx.announcements.timezone().to_string()) {
            embed.field(name, value, true);
        }
        msg.channel_id
            .send_message(&serenity_ctx.http, |m| m.set_embed(embed))
            .await?;
        Ok(())
    }
}

/// One parsed setter command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting {
    Channel(String),
    Role(Option<String>),
    Day(Weekday),
    Time(u32, u32),
    Message(String),
}

impl Setting {
    fn apply(self, announcement: &mut WeeklyAnnouncement) -> Result<(), ValidationError> {
        match self {
            Setting::Channel(channel_id) => announcement.channel_id = Some(channel_id),
            Setting::Role(role_id) => announcement.role_id = role_id,
            Setting::Day(weekday) => announcement.weekday = weekday,
            Setting::Time(hour, minute) => announcement.set_time(hour, minute)?,
            Setting::Message(message) => announcement.message = message,
        }
        Ok(())
    }

    pub fn confirmation(&self) -> String {
        match self {
            Setting::Channel(channel_id) => {
                format!("✅ Announcement channel set to <#{channel_id}>")
            }
            Setting::Role(Some(role)) => format!("✅ Announcement role set to <@&{role}>"),
            Setting::Role(None) => "✅ Announcement role cleared".to_string(),
            Setting::Day(weekday) => {
                format!("✅ Announcement day set to {}", weekday_name(*weekday))
            }
            Setting::Time(hour, minute) => {
                format!("✅ Announcement time set to {hour:02}:{minute:02}")
            }
            Setting::Message(message) => format!("✅ Announcement message set to: {message}"),
        }
    }
}

/// Parse a setter command's arguments; `setchannel` with no argument means
/// `current_channel`.
pub fn parse_setting(
    command: &str,
    args: &str,
    current_channel: &str,
) -> Result<Setting, ValidationError> {
    let args = args.trim();
    match command {
        "setchannel" if args.is_empty() => Ok(Setting::Channel(current_channel.to_string())),
        "setchannel" => parse_channel_arg(args).map(Setting::Channel),
        "setrole" => parse_role_arg(args).map(Setting::Role),
        "setday" => parse_weekday(args).map(Setting::Day),
        "settime" => parse_time_args(args).map(|(hour, minute)| Setting::Time(hour, minute)),
        "setmessage" if args.is_empty() => Err(ValidationError::MessageRequired),
        "setmessage" => Ok(Setting::Message(args.to_string())),
        _ => Err(ValidationError::MissingArgument("command")),
    }
}

fn channel_arg_regex() -> &'static Regex {
    static CHANNEL: OnceLock<Regex> = OnceLock::new();
    CHANNEL.get_or_init(|| Regex::new(r"^(?:<#(\d+)>|(\d+))$").expect("static regex"))
}

fn role_arg_regex() -> &'static Regex {
    static ROLE: OnceLock<Regex> = OnceLock::new();
    ROLE.get_or_init(|| Regex::new(r"^(?:<@&(\d+)>|(\d+))$").expect("static regex"))
}

fn capture_id(regex: &Regex, text: &str) -> Option<String> {
    let caps = regex.captures(text)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str().to_string())
}

/// Accepts `<#id>` or a raw channel id
pub fn parse_channel_arg(args: &str) -> Result<String, ValidationError> {
    let token = args.trim();
    capture_id(channel_arg_regex(), token)
        .ok_or_else(|| ValidationError::InvalidMention(token.to_string()))
}

/// Accepts `<@&id>`, a raw role id, or `none` to clear the role
pub fn parse_role_arg(args: &str) -> Result<Option<String>, ValidationError> {
    let token = args.trim();
    if token.is_empty() {
        return Err(ValidationError::MissingArgument("role"));
    }
    if token.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    capture_id(role_arg_regex(), token)
        .map(Some)
        .ok_or_else(|| ValidationError::InvalidMention(token.to_string()))
}

/// Accepts `HH MM`, `HH:MM` or a bare hour
pub fn parse_time_args(args: &str) -> Result<(u32, u32), ValidationError> {
    let normalized = args.trim().replace(':', " ");
    let mut parts = normalized.split_whitespace();
    let hour = parts
        .next()
        .ok_or(ValidationError::MissingArgument("hour"))?
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidTimeOfDay)?;
    let minute = match parts.next() {
        Some(m) => m.parse::<u32>().map_err(|_| ValidationError::InvalidTimeOfDay)?,
        None => 0,
    };
    if parts.next().is_some() || hour > 23 || minute > 59 {
        return Err(ValidationError::InvalidTimeOfDay);
    }
    Ok((hour, minute))
}

/// Fields for `announceconfig`: (name, value)
pub fn config_fields(announcement: &WeeklyAnnouncement, timezone: &str) -> Vec<(&'static str, String)> {
    vec![
        (
            "Channel",
            announcement
                .channel_id
                .as_ref()
                .map(|c| format!("<#{c}>"))
                .unwrap_or_else(|| "Not set".to_string()),
        ),
        (
            "Role",
            announcement
                .role_id
                .as_ref()
                .map(|r| format!("<@&{r}>"))
                .unwrap_or_else(|| "Not set".to_string()),
        ),
        ("Day", weekday_name(announcement.weekday).to_string()),
        (
            "Time",
            format!("{:02}:{:02} ({timezone})", announcement.hour, announcement.minute),
        ),
        ("Message", truncate_for_field(&announcement.message)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_channel_arg() {
        assert_eq!(parse_channel_arg("<#123>"), Ok("123".to_string()));
        assert_eq!(parse_channel_arg(" 456 "), Ok("456".to_string()));
        assert_eq!(
            parse_channel_arg("#general"),
            Err(ValidationError::InvalidMention("#general".to_string()))
        );
    }

    #[test]
    fn test_parse_role_arg() {
        assert_eq!(parse_role_arg("<@&77>"), Ok(Some("77".to_string())));
        assert_eq!(parse_role_arg("77"), Ok(Some("77".to_string())));
        assert_eq!(parse_role_arg("None"), Ok(None));
        assert_eq!(parse_role_arg(""), Err(ValidationError::MissingArgument("role")));
        assert!(parse_role_arg("<@77>").is_err());
    }

    #[test]
    fn test_parse_time_args() {
        assert_eq!(parse_time_args("14 30"), Ok((14, 30)));
        assert_eq!(parse_time_args("09:05"), Ok((9, 5)));
        assert_eq!(parse_time_args("2"), Ok((2, 0)));
        assert_eq!(parse_time_args("24 00"), Err(ValidationError::InvalidTimeOfDay));
        assert_eq!(parse_time_args("12 60"), Err(ValidationError::InvalidTimeOfDay));
        assert_eq!(parse_time_args("noon"), Err(ValidationError::InvalidTimeOfDay));
        assert_eq!(parse_time_args("1 2 3"), Err(ValidationError::InvalidTimeOfDay));
        assert_eq!(parse_time_args(""), Err(ValidationError::MissingArgument("hour")));
    }

    #[test]
    fn test_parse_setting() {
        assert_eq!(
            parse_setting("setchannel", "", "55"),
            Ok(Setting::Channel("55".to_string()))
        );
        assert_eq!(
            parse_setting("setchannel", "<#9>", "55"),
            Ok(Setting::Channel("9".to_string()))
        );
        assert_eq!(parse_setting("setday", "viernes", "55"), Ok(Setting::Day(Weekday::Fri)));
        assert_eq!(parse_setting("settime", "7:45", "55"), Ok(Setting::Time(7, 45)));
        assert_eq!(
            parse_setting("setmessage", "  ", "55"),
            Err(ValidationError::MessageRequired)
        );
        assert_eq!(
            parse_setting("setmessage", "reset day", "55")
                .unwrap()
                .confirmation(),
            "✅ Announcement message set to: reset day"
        );
    }

    #[test]
    fn test_unknown_setter_is_an_error_not_an_empty_reply() {
        let result = parse_setting("announceconfig", "", "55");
        assert_eq!(result, Err(ValidationError::MissingArgument("command")));
        let reply = ReminderError::from(result.unwrap_err()).user_message();
        assert!(!reply.is_empty());
    }

    #[test]
    fn test_setting_apply() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut announcement = WeeklyAnnouncement::new("g1", now);
        Setting::Role(Some("3".to_string())).apply(&mut announcement).unwrap();
        Setting::Time(22, 15).apply(&mut announcement).unwrap();
        assert_eq!(announcement.role_id.as_deref(), Some("3"));
        assert_eq!((announcement.hour, announcement.minute), (22, 15));

        Setting::Role(None).apply(&mut announcement).unwrap();
        assert_eq!(announcement.role_id, None);
        assert_eq!(
            Setting::Time(24, 0).apply(&mut announcement),
            Err(ValidationError::InvalidTimeOfDay)
        );
    }

    #[test]
    fn test_config_fields() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut announcement = WeeklyAnnouncement::new("g1", now);
        announcement.channel_id = Some("10".to_string());
        announcement.weekday = Weekday::Thu;
        announcement.set_time(18, 5).unwrap();

        let fields = config_fields(&announcement, "America/Bogota");
        assert_eq!(fields[0], ("Channel", "<#10>".to_string()));
        assert_eq!(fields[1], ("Role", "Not set".to_string()));
        assert_eq!(fields[2], ("Day", "thursday".to_string()));
        assert_eq!(fields[3], ("Time", "18:05 (America/Bogota)".to_string()));
    }
}
