//! Discord gateway runtime.
//!
//! One shard runner per shard: it drains gateway events, records identity
//! from READY, synchronizes the guild command set, and hands interactions to
//! their own tasks so a slow registry operation never blocks the event loop.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, trace, warn};

use twilight_gateway::{
    self as gateway, CloseFrame, Config, Event, EventTypeFlags, Intents, MessageSender, Shard,
    StreamExt,
};
use twilight_http::client::ClientBuilder;
use twilight_http::Client as HttpClient;
use twilight_model::gateway::payload::incoming::Ready;
use twilight_model::id::marker::{ApplicationMarker, GuildMarker};
use twilight_model::id::Id;

use super::commands;
use super::interactions::{self, PendingPrompt};
use crate::application::errors::BotError;
use crate::application::lifecycle::LifecycleManager;
use crate::domain::traits::ExtensionRegistry;

/// State shared by every shard runner and interaction task.
pub struct BotContext<R: ExtensionRegistry> {
    pub http: Arc<HttpClient>,
    /// Learned from READY; interactions cannot arrive before it.
    pub application_id: OnceCell<Id<ApplicationMarker>>,
    /// Bot display name from READY, used on the extension-list embed.
    pub bot_user: OnceCell<String>,
    /// Fallback display name from file configuration.
    pub display_name: String,
    pub guild_id: Id<GuildMarker>,
    pub manager: Arc<LifecycleManager<R>>,
    /// Armed selection prompts, keyed by select-menu custom id.
    pub prompts: Mutex<HashMap<String, PendingPrompt>>,
}

pub struct DiscordPlatform<R: ExtensionRegistry + 'static> {
    token: String,
    ctx: Arc<BotContext<R>>,
    shard_tasks: Vec<JoinHandle<()>>,
    shard_senders: Vec<MessageSender>,
}

impl<R: ExtensionRegistry + 'static> DiscordPlatform<R> {
    pub fn new(
        token: String,
        guild_id: Id<GuildMarker>,
        manager: Arc<LifecycleManager<R>>,
        display_name: String,
    ) -> Self {
        let http = Arc::new(
            ClientBuilder::new()
                .token(token.clone())
                .timeout(Duration::from_secs(30))
                .build(),
        );
        Self {
            token,
            ctx: Arc::new(BotContext {
                http,
                application_id: OnceCell::new(),
                bot_user: OnceCell::new(),
                display_name,
                guild_id,
                manager,
                prompts: Mutex::new(HashMap::new()),
            }),
            shard_tasks: Vec::new(),
            shard_senders: Vec::new(),
        }
    }

    /// Spawn the recommended shard set and start processing events.
    pub async fn connect(&mut self) -> Result<(), BotError> {
        let config = Config::new(self.token.clone(), Intents::GUILDS);

        let shards = gateway::create_recommended(&self.ctx.http, config, |_, builder| {
            builder.build()
        })
        .await
        .map_err(|e| BotError::Platform(format!("create_recommended error: {e}")))?;

        for shard in shards {
            self.shard_senders.push(shard.sender());
            let ctx = self.ctx.clone();
            self.shard_tasks
                .push(tokio::spawn(shard_runner(shard, ctx)));
        }

        Ok(())
    }

    /// Block until every shard runner ends.
    pub async fn wait(&mut self) {
        let tasks = std::mem::take(&mut self.shard_tasks);
        for task in tasks {
            let _ = task.await;
        }
    }

    /// Gracefully close the gateway sessions.
    pub async fn shutdown(&mut self) {
        for sender in &self.shard_senders {
            let _ = sender.close(CloseFrame::NORMAL);
        }
        for task in &mut self.shard_tasks {
            let _ = task.await;
        }
        self.shard_senders.clear();
        self.shard_tasks.clear();
    }
}

async fn shard_runner<R: ExtensionRegistry + 'static>(mut shard: Shard, ctx: Arc<BotContext<R>>) {
    let shard_id = shard.id().number();
    info!("Shard {shard_id} started. Listening for events.");

    while let Some(item) = shard.next_event(EventTypeFlags::all()).await {
        match item {
            Ok(Event::Ready(ready)) => on_ready(ready.as_ref(), &ctx).await,
            Ok(Event::InteractionCreate(event)) => {
                // Handlers suspend on registry and HTTP calls; run each on
                // its own task so the shard keeps draining events.
                let ctx = ctx.clone();
                tokio::spawn(interactions::handle(ctx, event.0));
            }
            Ok(event) => {
                trace!("Shard {shard_id} => unhandled event: {event:?}");
            }
            Err(err) => {
                error!("Shard {shard_id} => error receiving event: {err:?}");
            }
        }
    }

    warn!("Shard {shard_id} event loop ended.");
}

async fn on_ready<R: ExtensionRegistry>(ready: &Ready, ctx: &Arc<BotContext<R>>) {
    let _ = ctx.application_id.set(ready.application.id);
    let _ = ctx.bot_user.set(ready.user.name.clone());
    info!("READY as {} (ID={})", ready.user.name, ready.user.id);

    match commands::sync_guild_commands(&ctx.http, ready.application.id, ctx.guild_id).await {
        Ok(()) => info!("Slash commands synced; startup complete"),
        Err(e) => error!("Failed to sync commands at startup: {e}"),
    }
}
