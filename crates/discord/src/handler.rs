//! Discord event handler for serenity.
//!
//! Implements the EventHandler trait to feed gateway messages into the router.

use std::sync::{Arc, OnceLock};

use {
    relay_routing::Router,
    serenity::{
        all::{Context, EventHandler, GatewayIntents, GuildId, Message, Ready, UserId},
        async_trait,
    },
    tracing::{debug, info, warn},
};

use crate::convert;

/// Handler for Discord gateway events.
pub struct RelayHandler {
    router: Arc<Router>,
    bot_user_id: OnceLock<UserId>,
}

impl RelayHandler {
    pub fn new(router: Arc<Router>) -> Self {
        Self {
            router,
            bot_user_id: OnceLock::new(),
        }
    }

    /// Required gateway intents for the bot.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT
    }

    fn is_self(&self, author: UserId) -> bool {
        self.bot_user_id.get().is_some_and(|id| *id == author)
    }
}

#[async_trait]
impl EventHandler for RelayHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            bot_name = %ready.user.name,
            bot_id = %ready.user.id,
            guilds = ready.guilds.len(),
            "discord bot ready"
        );

        if self.bot_user_id.set(ready.user.id).is_err() {
            debug!("gateway reconnected, bot user id already known");
        }

        let registry = self.router.registry();
        info!(
            channel_id = self.router.source_channel_id(),
            "listening on source channel"
        );
        if registry.is_empty() {
            warn!("no destinations configured, messages will not be relayed");
        } else {
            info!(destinations = ?registry.names(), "loaded destinations");
        }
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        // Skip the embed conversion entirely for foreign channels.
        if msg.channel_id.get() != self.router.source_channel_id() {
            return;
        }

        let event = convert::inbound_event(
            msg.channel_id.get(),
            self.is_self(msg.author.id),
            &msg.author.name,
            &msg.content,
            &msg.embeds,
        );

        let outcome = self.router.route(&event);
        if !outcome.delivered.is_empty() {
            debug!(
                message_id = %msg.id,
                destinations = ?outcome.delivered,
                "message relayed"
            );
        }
    }

    async fn cache_ready(&self, _ctx: Context, guilds: Vec<GuildId>) {
        debug!(guild_count = guilds.len(), "discord cache ready");
    }
}
