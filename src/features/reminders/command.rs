//! Turns `remind` command text into a reminder request
//!
//! Grammar: `[me |meorother ][<#channel> ]<duration> <message...>`
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use super::duration;
use crate::core::ValidationError;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// Parsed `remind` arguments, not yet scheduled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRequest {
    /// `None` means "notify the owner"
    pub target_id: Option<String>,
    pub channel_id: String,
    pub message: String,
    pub duration: Duration,
}

fn channel_regex() -> &'static Regex {
    static CHANNEL: OnceLock<Regex> = OnceLock::new();
    CHANNEL.get_or_init(|| Regex::new(r"(?s)^<#(\d+)>\s+(.+)$").expect("static regex"))
}

fn mention_regex() -> &'static Regex {
    static MENTION: OnceLock<Regex> = OnceLock::new();
    MENTION.get_or_init(|| Regex::new(r"<@!?(\d+)>").expect("static regex"))
}

/// First user mention (`<@id>` or `<@!id>`) in `text`
pub fn first_user_mention(text: &str) -> Option<String> {
    mention_regex()
        .captures(text)
        .map(|caps| caps[1].to_string())
}

/// Parse the text after `remind`.
///
/// Pure: nothing is stored and nothing is sent.
///
/// # Errors
///
/// [`ValidationError::InvalidTimeFormat`] when the duration token is missing,
/// unparseable or zero; [`ValidationError::MessageRequired`] when nothing
/// follows it.
pub fn parse_command(
    raw: &str,
    default_owner: &str,
    default_channel: &str,
) -> Result<ReminderRequest, ValidationError> {
    let mut content = raw.trim();
    let mut target_id = None;

    if let Some(rest) = content.strip_prefix("me ") {
        target_id = Some(default_owner.to_string());
        content = rest;
    } else if let Some(rest) = content.strip_prefix("meorother ") {
        content = rest;
    }
    content = content.trim_start();

    let mut channel_id = default_channel.to_string();
    if let Some(caps) = channel_regex().captures(content) {
        if let (Some(id), Some(rest)) = (caps.get(1), caps.get(2)) {
            channel_id = id.as_str().to_string();
            content = rest.as_str();
        }
    }

    let mut words = content.split_whitespace();
    let token = words.next().ok_or(ValidationError::InvalidTimeFormat)?;
    let duration = duration::parse(token)?;
    if duration.is_zero() {
        return Err(ValidationError::InvalidTimeFormat);
    }

    let message = words.collect::<Vec<_>>().join(" ");
    if message.is_empty() {
        return Err(ValidationError::MessageRequired);
    }

    if target_id.is_none() && raw.contains("meorother") {
        target_id =
            Some(first_user_mention(&message).unwrap_or_else(|| default_owner.to_string()));
    }

    Ok(ReminderRequest {
        target_id,
        channel_id,
        message,
        duration,
    })
}
