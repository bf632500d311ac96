//! Text command handler trait and invocation parsing
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use async_trait::async_trait;
use serenity::model::channel::Message;
use serenity::prelude::Context;
use std::sync::Arc;
use uuid::Uuid;

use super::context::CommandContext;

/// A prefixed command split into name and argument text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Lowercased command name without the prefix
    pub name: String,
    /// Everything after the name, trimmed
    pub args: String,
    /// Correlates log lines for one message
    pub request_id: Uuid,
}

impl Invocation {
    /// Split `content` into a command if it starts with `prefix`
    pub fn parse(content: &str, prefix: &str) -> Option<Self> {
        let rest = content.trim().strip_prefix(prefix)?;
        if rest.starts_with(char::is_whitespace) {
            return None;
        }
        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };
        if name.is_empty() {
            return None;
        }
        Some(Invocation {
            name: name.to_lowercase(),
            args: args.to_string(),
            request_id: Uuid::new_v4(),
        })
    }
}

/// Trait for prefix command handlers
///
/// Each handler processes one or more command names and is registered with a
/// [`CommandRegistry`](super::registry::CommandRegistry).
///
/// # Example
///
/// ```ignore
/// pub struct PingHandler;
///
/// #[async_trait]
/// impl TextCommandHandler for PingHandler {
///     fn command_names(&self) -> &'static [&'static str] {
///         &["ping"]
///     }
///
///     async fn handle(
///         &self,
///         ctx: Arc<CommandContext>,
///         serenity_ctx: &Context,
///         msg: &Message,
///         invocation: &Invocation,
///     ) -> Result<()> {
///         msg.channel_id.say(&serenity_ctx.http, "Pong!").await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait TextCommandHandler: Send + Sync {
    /// Command name(s) this handler processes
    fn command_names(&self) -> &'static [&'static str];

    /// Handle one invocation
    ///
    /// # Arguments
    ///
    /// * `ctx` - Shared command context with the schedulers
    /// * `serenity_ctx` - Serenity context for Discord API calls
    /// * `msg` - The message that carried the command
    /// * `invocation` - Parsed command name and arguments
    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        msg: &Message,
        invocation: &Invocation,
    ) -> Result<()>;
}
