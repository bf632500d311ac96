//! Utility command handlers
//!
//! Handles: help
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use serenity::model::channel::Message;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::{Invocation, TextCommandHandler};
use crate::core::{format_duration, truncate_for_message};

/// Handler for utility commands: help
pub struct UtilityHandler;

#[async_trait]
impl TextCommandHandler for UtilityHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["help"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        msg: &Message,
        invocation: &Invocation,
    ) -> Result<()> {
        match invocation.name.as_str() {
            "help" => self.handle_help(&ctx, serenity_ctx, msg).await,
            _ => Ok(()),
        }
    }
}

impl UtilityHandler {
    /// Handle .help command
    async fn handle_help(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        msg: &Message,
    ) -> Result<()> {
        let uptime = format_duration(ctx.start_time.elapsed().as_secs() as i64);
        let text = help_text(&ctx.prefix, ctx.reminders.pending_count().await, &uptime);
        msg.channel_id
            .say(&serenity_ctx.http, truncate_for_message(&text))
            .await?;

        info!("Help command completed for user {}", msg.author.id);
        Ok(())
    }
}

pub fn help_text(prefix: &str, pending: usize, uptime: &str) -> String {
    format!(
        r#"**Reminders:**
`{p}remind [me|meorother] [#channel] <time> <message>` - Set a reminder (e.g. `{p}remind 1h30m check the oven`)
`{p}reminders` - List your active reminders
`{p}remove <number>` - Delete one reminder
`{p}removeall` - Delete all your reminders
Time units: `s`, `m`, `h`, `d`, `w`, `mo` (combine them: `1d2h`)

**Weekly announcement (admins):**
`{p}setchannel [#channel]` - Channel to post in
`{p}setrole <@role|none>` - Role to mention
`{p}setday <day>` - Day of the week
`{p}settime <hour> [minute]` - 24-hour time
`{p}setmessage <text>` - Announcement text
`{p}announceconfig` - Show current settings

*{pending} reminders pending, up {uptime}*"#,
        p = prefix
    )
}
