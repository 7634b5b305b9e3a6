//! Discord bot core logic and event handling.

use std::error::Error as StdError;

use log::{debug, error, info, warn};
use poise::{
    Framework, FrameworkOptions,
    serenity_prelude::{
        ClientBuilder, Context, FullEvent, GatewayIntents, Message as SerenityMessage,
    },
};

use crate::chatbot::{ConversationController, HostNotify, usage_text};
use crate::config::Config;
use crate::error::Result;
use crate::llm::LlmClient;
use crate::store::{MemoryStore, S3Store, StoreBackend};
use crate::text::{DISCORD_MESSAGE_LIMIT, split_chunks};
use crate::trigger::ThreadRandom;
use crate::types::InboundMessage;

type EventResult = std::result::Result<(), Box<dyn StdError + Send + Sync>>;

type Controller = ConversationController<StoreBackend, LlmClient, ThreadRandom>;

pub struct Data {
    controller: Controller,
}

/// Run the Discord bot.
pub async fn run() -> Result<()> {
    info!("Initializing bot");
    let config = Config::from_env()?;

    debug!("Initializing LLM client");
    let llm_client = LlmClient::new(&config.llm)?;

    let store = if let Some(s3) = &config.s3 {
        StoreBackend::S3(S3Store::from_config(s3).await?)
    } else {
        warn!("S3_BUCKET not set, conversations are kept in memory only");
        StoreBackend::Memory(MemoryStore::new())
    };

    let usage = usage_text(&config.conversation, Some(&config.llm));
    let controller = ConversationController::new(
        store,
        llm_client,
        ThreadRandom,
        config.conversation.clone(),
    )
    .with_usage(usage);

    debug!("Setting up gateway intents");
    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

    debug!("Building framework");
    let framework = Framework::builder()
        .options(FrameworkOptions {
            event_handler: |ctx, event, _framework, data| Box::pin(event_handler(ctx, event, data)),
            ..Default::default()
        })
        .setup(move |_ctx, _ready, _framework| {
            Box::pin(async move {
                info!("Bot is ready and connected to Discord");
                Ok(Data { controller })
            })
        })
        .build();

    debug!("Creating Discord client");
    let mut client = ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    info!("Starting Discord client");

    tokio::select! {
        result = client.start() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down...");
        }
    }

    Ok(())
}

/// Normalize a Discord message into the controller's inbound event.
///
/// Legacy nickname mentions (`<@!id>`) are rewritten to the plain form so a
/// single token identifies the bot.
fn inbound_message(
    message: &SerenityMessage,
    bot_mention: &str,
    nick_mention: &str,
) -> InboundMessage {
    InboundMessage::new(
        message.channel_id.to_string(),
        message.content.replace(nick_mention, bot_mention),
        bot_mention,
    )
}

async fn event_handler(ctx: &Context, event: &FullEvent, data: &Data) -> EventResult {
    let FullEvent::Message { new_message } = event else {
        return Ok(());
    };
    if new_message.author.bot || new_message.content.is_empty() {
        return Ok(());
    }

    let bot_user_id = ctx.cache.current_user().id;
    let inbound = inbound_message(
        new_message,
        &format!("<@{bot_user_id}>"),
        &format!("<@!{bot_user_id}>"),
    );

    if inbound.mentions_bot() {
        info!(
            "Received mention from {} in channel {}: {}",
            new_message.author.tag(),
            new_message.channel_id,
            new_message.content
        );
        if let Err(e) = new_message.channel_id.broadcast_typing(&ctx.http).await {
            debug!("Failed to broadcast typing indicator: {e}");
        }
    }

    let outcome = data.controller.handle(&inbound).await?;

    if let HostNotify::Failure(detail) = &outcome.host_notify {
        error!(
            "Generation failed for message from {} in channel {}: {}",
            new_message.author.tag(),
            new_message.channel_id,
            detail
        );
    }

    if let Some(text) = &outcome.reply {
        for chunk in split_chunks(text, DISCORD_MESSAGE_LIMIT) {
            new_message.channel_id.say(&ctx.http, chunk).await?;
        }
        info!("Replied in channel {}: {}", new_message.channel_id, text);
    }

    Ok(())
}
