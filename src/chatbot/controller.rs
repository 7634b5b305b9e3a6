//! Handles one inbound message end to end.

use log::{debug, info, warn};

use crate::config::ConversationConfig;
use crate::error::{BotError, Result};
use crate::gateway::{ChatRequest, ModelGateway, window};
use crate::segment::{has_image, segment};
use crate::store::ConversationStore;
use crate::trigger::{Command, RandomSource, ResponseTrigger, Trigger};
use crate::types::{ContentSegment, InboundMessage, Message, MessageContent};

use super::locks::ChannelLocks;
use super::outcome::Outcome;
use super::usage::usage_text;

const FAREWELL: &str = "にゃーん";

/// Orchestrates trigger policy, history storage and the model backend.
pub struct ConversationController<S, G, R> {
    store: S,
    gateway: G,
    random: R,
    trigger: ResponseTrigger,
    config: ConversationConfig,
    usage: String,
    locks: ChannelLocks,
}

impl<S, G, R> ConversationController<S, G, R>
where
    S: ConversationStore,
    G: ModelGateway,
    R: RandomSource,
{
    pub fn new(store: S, gateway: G, random: R, config: ConversationConfig) -> Self {
        Self {
            store,
            gateway,
            random,
            trigger: ResponseTrigger::new(config.ambient_chance),
            usage: usage_text(&config, None),
            config,
            locks: ChannelLocks::new(),
        }
    }

    /// Replace the `/help` text.
    #[must_use]
    pub fn with_usage(mut self, usage: String) -> Self {
        self.usage = usage;
        self
    }

    /// Handle one inbound message.
    ///
    /// Backend failures are reported through the returned [`Outcome`]; store
    /// failures come back as `Err`.
    pub async fn handle(&self, event: &InboundMessage) -> Result<Outcome> {
        let prompt = event.prompt();

        match self.trigger.decide(event, &prompt, &self.random) {
            Trigger::Command(Command::Help) => {
                debug!("Help requested in channel {}", event.channel_id);
                Ok(Outcome::reply(self.usage.clone()))
            }
            Trigger::Command(Command::Bye) => self.forget(&event.channel_id).await,
            Trigger::Mention | Trigger::Ambient => self.generate(&event.channel_id, &prompt).await,
            Trigger::Ignore => self.listen(&event.channel_id, &prompt).await,
        }
    }

    async fn forget(&self, channel_id: &str) -> Result<Outcome> {
        let _guard = self.locks.lock(channel_id).await;
        self.store.delete(channel_id).await?;
        info!("Forgot conversation in channel {channel_id}");
        Ok(Outcome::reset(FAREWELL))
    }

    async fn listen(&self, channel_id: &str, prompt: &str) -> Result<Outcome> {
        if !self.config.listen_ambient || prompt.is_empty() {
            return Ok(Outcome::ignored());
        }

        let _guard = self.locks.lock(channel_id).await;
        let mut history = self.store.get(channel_id).await?.unwrap_or_default();
        history.push(Message::user(user_content(prompt, &segment(prompt))));
        self.persist(channel_id, history).await?;
        Ok(Outcome::ignored())
    }

    async fn generate(&self, channel_id: &str, prompt: &str) -> Result<Outcome> {
        let _guard = self.locks.lock(channel_id).await;

        let mut history = self.store.get(channel_id).await?.unwrap_or_default();
        let segments = segment(prompt);
        if !prompt.is_empty() {
            history.push(Message::user(user_content(prompt, &segments)));
        }

        let request = if has_image(&segments) {
            ChatRequest::vision(&self.config.system_prompt, &segments)
        } else {
            ChatRequest::text(
                &self.config.system_prompt,
                window(&history, self.config.history_window),
            )
        };
        debug!(
            "Generating {} reply in channel {} from {} stored messages",
            if request.is_vision() { "vision" } else { "text" },
            channel_id,
            history.len()
        );

        match self.complete(&request).await {
            Ok(reply) => {
                history.push(Message::assistant(reply.clone()));
                self.persist(channel_id, history).await?;
                Ok(Outcome::reply(reply))
            }
            Err(err) if err.is_generation_failure() => {
                warn!("Generation failed in channel {channel_id}, resetting conversation: {err}");
                self.store.delete(channel_id).await?;
                Ok(Outcome::failure(&err))
            }
            Err(err) => Err(err),
        }
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        match self.gateway.chat(request).await? {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(BotError::EmptyResponse),
        }
    }

    async fn persist(&self, channel_id: &str, mut history: Vec<Message>) -> Result<()> {
        if let Some(limit) = self.config.store_limit
            && history.len() > limit
        {
            history.drain(..history.len() - limit);
        }
        self.store.set(channel_id, &history).await
    }
}

/// Stored form of a user turn: plain text unless the prompt carries an image.
fn user_content(prompt: &str, segments: &[ContentSegment]) -> MessageContent {
    if has_image(segments) {
        MessageContent::Segments(segments.to_vec())
    } else {
        MessageContent::Text(prompt.to_string())
    }
}
