use crate::commands::handlers::create_all_handlers;
use crate::commands::registry::Route;
use crate::commands::{CommandContext, CommandRegistry};
use anyhow::Result;
use log::{debug, error, info};
use serenity::model::channel::Message;
use serenity::prelude::Context;
use std::sync::Arc;

/// Routes prefixed messages to the registered text command handlers
#[derive(Clone)]
pub struct CommandHandler {
    context: Arc<CommandContext>,
    registry: CommandRegistry,
}

impl CommandHandler {
    pub fn new(context: CommandContext) -> Self {
        let registry = CommandRegistry::with_handlers(create_all_handlers());
        info!("Registered {} text commands", registry.len());

        Self {
            context: Arc::new(context),
            registry,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.context.prefix
    }

    /// Match `content` against the configured prefix and registered commands
    pub fn route(&self, content: &str) -> Option<Route> {
        self.registry.route(content, &self.context.prefix)
    }

    pub async fn handle_message(&self, ctx: &Context, msg: &Message) -> Result<()> {
        if msg.author.bot {
            return Ok(());
        }

        let Some(Route {
            invocation,
            handler,
        }) = self.route(&msg.content)
        else {
            return Ok(());
        };

        let request_id = invocation.request_id;
        info!(
            "[{request_id}] 🎯 Processing {}{} | User: {} | Channel: {} | Guild: {}",
            self.context.prefix,
            invocation.name,
            msg.author.id,
            msg.channel_id,
            msg.guild_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "DM".to_string())
        );

        if let Err(e) = handler
            .handle(Arc::clone(&self.context), ctx, msg, &invocation)
            .await
        {
            error!("[{request_id}] ❌ Command {} failed: {e}", invocation.name);
            if let Err(send_err) = msg
                .channel_id
                .say(&ctx.http, "❌ An error occurred while processing that command.")
                .await
            {
                error!("[{request_id}] Failed to send error reply: {send_err}");
            }
            return Ok(());
        }

        debug!("[{request_id}] ✅ Command {} completed", invocation.name);
        Ok(())
    }
}
