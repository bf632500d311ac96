use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info, warn};
use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::{Activity, Ready};
use serenity::model::user::OnlineStatus;
use serenity::prelude::*;
use std::sync::Arc;
use tokio::sync::watch;

use kunzeu::commands::{CommandContext, CommandHandler};
use kunzeu::core::{Config, StorageBackend};
use kunzeu::database::{AnnouncementStore, JsonFileStore, ReminderStore, SqliteStore};
use kunzeu::features::announcements::{AnnouncementScheduler, ChannelAnnouncer};
use kunzeu::features::reminders::{DirectMessageNotifier, ReminderScheduler};

struct Handler {
    command_handler: Arc<CommandHandler>,
    activity: String,
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if let Err(e) = self.command_handler.handle_message(&ctx, &msg).await {
            error!("Error handling message: {e}");
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);

        if let Some(shard) = ready.shard {
            info!("⚡ Shard: {}/{}", shard[0] + 1, shard[1]);
        }

        ctx.set_presence(Some(Activity::playing(&self.activity)), OnlineStatus::Idle)
            .await;
        info!(
            "Listening for commands with prefix '{}'",
            self.command_handler.prefix()
        );
    }
}

/// Open the configured backend once and hand out both store views of it
fn open_stores(config: &Config) -> Result<(Arc<dyn ReminderStore>, Arc<dyn AnnouncementStore>)> {
    match config.storage_backend {
        StorageBackend::Sqlite => {
            let store = Arc::new(SqliteStore::open(&config.database_path)?);
            let reminders: Arc<dyn ReminderStore> = store.clone();
            let announcements: Arc<dyn AnnouncementStore> = store;
            Ok((reminders, announcements))
        }
        StorageBackend::Json => {
            let store = Arc::new(JsonFileStore::open(&config.json_store_path)?);
            let reminders: Arc<dyn ReminderStore> = store.clone();
            let announcements: Arc<dyn AnnouncementStore> = store;
            Ok((reminders, announcements))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Kunzeu reminder bot...");
    info!("Storage backend: {:?}", config.storage_backend);

    let (reminder_store, announcement_store) = open_stores(&config)?;

    let reminders = Arc::new(
        ReminderScheduler::load(reminder_store.clone(), config.reminder_tick).await?,
    );
    let announcements = Arc::new(AnnouncementScheduler::new(
        announcement_store,
        config.announcement_timezone,
        config.announcement_tick,
    ));

    let command_handler = CommandHandler::new(CommandContext::new(
        reminders.clone(),
        announcements.clone(),
        config.command_prefix.clone(),
    ));
    let handler = Handler {
        command_handler: Arc::new(command_handler),
        activity: config.bot_activity.clone(),
    };

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    // Build the Discord client with proper gateway configuration
    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            error!("This could indicate:");
            error!("  - Invalid bot token format");
            error!("  - Network issues reaching Discord API");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Bot configured successfully. Connecting to Discord gateway...");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let http = client.cache_and_http.http.clone();

    // Start the reminder scheduler
    let reminder_loop = tokio::spawn(reminders.clone().run(
        Arc::new(DirectMessageNotifier::new(http.clone())),
        shutdown_rx.clone(),
    ));

    // Start the weekly announcement scheduler
    let announcement_loop = tokio::spawn(
        announcements
            .clone()
            .run(Arc::new(ChannelAnnouncer::new(http)), shutdown_rx),
    );

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {e}");
            return;
        }
        info!("Shutdown signal received, stopping gateway...");
        shard_manager.lock().await.shutdown_all().await;
    });

    info!("Gateway intents: {intents:?}");
    let gateway_result = client.start().await;

    // Gateway is down; let both loops finish their current sweep
    if shutdown_tx.send(true).is_err() {
        warn!("Schedulers already stopped");
    }
    for (name, task) in [("reminder", reminder_loop), ("announcement", announcement_loop)] {
        if let Err(e) = task.await {
            error!("The {name} scheduler task failed: {e}");
        }
    }
    if let Err(e) = reminder_store.close().await {
        error!("Failed to close store: {e}");
    }
    info!("Shutdown complete");

    gateway_result.map_err(|why| {
        error!("Gateway connection failed: {why:?}");
        anyhow::anyhow!("Failed to establish gateway connection: {}", why)
    })
}
