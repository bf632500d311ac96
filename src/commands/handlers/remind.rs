//! Reminder command handlers
//!
//! Handles: remind, reminders, remove, removeall
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::{Invocation, TextCommandHandler};
use crate::core::response::MAX_EMBED_FIELDS;
use crate::core::{
    discord_timestamp, format_display_time, format_duration, format_time_left, truncate_for_field,
    ReminderError, ValidationError,
};
use crate::features::reminders::{parse_command, BulkRemoval, Reminder};

const CREATED_COLOR: u32 = 0x2ECC71;
const LIST_COLOR: u32 = 0x3498DB;

pub const NO_REMINDERS: &str = "You have no active reminders.";
pub const NO_REMINDERS_TO_DELETE: &str = "You have no active reminders to delete.";
pub const DELETE_FAILED: &str = "❌ There was an error deleting the reminder.";

/// Handler for reminder-related commands
pub struct RemindHandler;

#[async_trait]
impl TextCommandHandler for RemindHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["remind", "reminders", "remove", "removeall"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        msg: &Message,
        invocation: &Invocation,
    ) -> Result<()> {
        match invocation.name.as_str() {
            "remind" => self.handle_remind(&ctx, serenity_ctx, msg, invocation).await,
            "reminders" => self.handle_reminders(&ctx, serenity_ctx, msg).await,
            "remove" => self.handle_remove(&ctx, serenity_ctx, msg, invocation).await,
            "removeall" => self.handle_remove_all(&ctx, serenity_ctx, msg).await,
            _ => Ok(()),
        }
    }
}

impl RemindHandler {
    /// Handle .remind - parse, persist and confirm a new reminder
    async fn handle_remind(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        msg: &Message,
        invocation: &Invocation,
    ) -> Result<()> {
        let request_id = invocation.request_id;
        let owner_id = msg.author.id.to_string();
        let channel_id = msg.channel_id.to_string();

        let request = match parse_command(&invocation.args, &owner_id, &channel_id) {
            Ok(request) => request,
            Err(e) => {
                debug!("[{request_id}] Rejected remind arguments: {e}");
                let reply = ReminderError::from(e).user_message();
                msg.channel_id.say(&serenity_ctx.http, format!("❌ {reply}")).await?;
                return Ok(());
            }
        };

        match ctx.reminders.create(&owner_id, request, Utc::now()).await {
            Ok(reminder) => {
                let embed = creation_embed(&reminder);
                msg.channel_id
                    .send_message(&serenity_ctx.http, |m| m.set_embed(embed))
                    .await?;
                info!(
                    "[{request_id}] Reminder {} scheduled in {}",
                    reminder.id,
                    format_duration((reminder.due_at - reminder.created_at).num_seconds())
                );
            }
            Err(e) => {
                warn!("[{request_id}] Reminder not created: {e}");
                msg.channel_id
                    .say(&serenity_ctx.http, format!("❌ {}", e.user_message()))
                    .await?;
            }
        }
        Ok(())
    }

    /// Handle .reminders - list the caller's pending reminders
    async fn handle_reminders(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        msg: &Message,
    ) -> Result<()> {
        let owner_id = msg.author.id.to_string();
        let reminders = ctx.reminders.list_for_owner(&owner_id).await;

        if reminders.is_empty() {
            msg.channel_id.say(&serenity_ctx.http, NO_REMINDERS).await?;
            return Ok(());
        }

        let embed = listing_embed(&reminders, Utc::now());
        msg.channel_id
            .send_message(&serenity_ctx.http, |m| m.set_embed(embed))
            .await?;
        Ok(())
    }

    /// Handle .remove <index>
    async fn handle_remove(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        msg: &Message,
        invocation: &Invocation,
    ) -> Result<()> {
        let owner_id = msg.author.id.to_string();

        let result = match parse_index(&invocation.args) {
            Ok(index) => ctx
                .reminders
                .remove_at(&owner_id, index)
                .await
                .map(|_| index),
            Err(e) => Err(e.into()),
        };

        let reply = match result {
            Ok(index) => format!("✅ Reminder #{index} has been deleted."),
            Err(ReminderError::Store(e)) => {
                warn!(
                    "[{}] Failed to delete reminder for {owner_id}: {e}",
                    invocation.request_id
                );
                DELETE_FAILED.to_string()
            }
            Err(e) => format!("❌ {}", e.user_message()),
        };
        msg.channel_id.say(&serenity_ctx.http, reply).await?;
        Ok(())
    }

    /// Handle .removeall
    async fn handle_remove_all(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        msg: &Message,
    ) -> Result<()> {
        let owner_id = msg.author.id.to_string();
        let result = ctx.reminders.remove_all(&owner_id).await;
        msg.channel_id
            .say(&serenity_ctx.http, bulk_removal_reply(result))
            .await?;
        Ok(())
    }
}

/// Confirmation line shown after `remind` succeeds
pub fn creation_reply(reminder: &Reminder) -> String {
    format!(
        "⏰ I will remind <@{}> **{}** {} ({})",
        reminder.recipient(),
        reminder.message,
        discord_timestamp(reminder.due_at, 'R'),
        discord_timestamp(reminder.due_at, 'f'),
    )
}

fn creation_embed(reminder: &Reminder) -> CreateEmbed {
    let mut embed = CreateEmbed::default();
    embed.color(CREATED_COLOR);
    embed.description(truncate_for_field(&creation_reply(reminder)));
    embed
}

/// One embed field per reminder, numbered from 1 in listing order.
///
/// Discord caps an embed at 25 fields; anything past that is left out.
pub fn listing_fields(reminders: &[Reminder], now: DateTime<Utc>) -> Vec<(String, String)> {
    reminders
        .iter()
        .take(MAX_EMBED_FIELDS)
        .enumerate()
        .map(|(i, reminder)| {
            let value = format!(
                "**Message:** {}\n**Channel:** <#{}>\n**Time left:** {}\n**Scheduled time:** {}",
                reminder.message,
                reminder.channel_id,
                format_time_left(reminder.due_at, now),
                format_display_time(reminder.due_at),
            );
            (format!("Reminder #{}", i + 1), truncate_for_field(&value))
        })
        .collect()
}

fn listing_embed(reminders: &[Reminder], now: DateTime<Utc>) -> CreateEmbed {
    let mut embed = CreateEmbed::default();
    embed.title("📝 Your Reminders");
    embed.color(LIST_COLOR);
    for (name, value) in listing_fields(reminders, now) {
        embed.field(name, value, false);
    }
    if reminders.len() > MAX_EMBED_FIELDS {
        embed.footer(|f| {
            f.text(format!(
                "Showing {MAX_EMBED_FIELDS} of {} reminders",
                reminders.len()
            ))
        });
    }
    embed
}

/// Parse the 1-based index argument of `remove`
pub fn parse_index(args: &str) -> Result<i64, ValidationError> {
    let token = args
        .split_whitespace()
        .next()
        .ok_or(ValidationError::MissingArgument("index"))?;
    token.parse().map_err(|_| ValidationError::InvalidIndex)
}

pub fn bulk_removal_reply(result: BulkRemoval) -> String {
    match result {
        BulkRemoval {
            removed: 0,
            failed: 0,
        } => NO_REMINDERS_TO_DELETE.to_string(),
        BulkRemoval { removed, failed: 0 } => {
            format!("✅ All your reminders have been deleted ({removed}).")
        }
        BulkRemoval { removed, failed } => format!(
            "⚠️ Some reminders could not be completely deleted ({removed} deleted, {failed} failed)."
        ),
    }
}
