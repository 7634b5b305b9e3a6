//! Test doubles for the controller's collaborators.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{BotError, Result};
use crate::gateway::{ChatRequest, ModelGateway};
use crate::store::ConversationStore;
use crate::trigger::RandomSource;
use crate::types::Message;

/// Always draws the same value.
pub struct FixedRandom(pub u32);

impl RandomSource for FixedRandom {
    fn below(&self, _upper: u32) -> u32 {
        self.0
    }
}

/// Gateway answering from a queue of canned results and recording requests.
#[derive(Default)]
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Result<Option<String>>>>,
    requests: Mutex<Vec<ChatRequest>>,
    delay: Option<Duration>,
}

impl ScriptedGateway {
    pub fn new(replies: impl IntoIterator<Item = Result<Option<String>>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn replying(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|text| Ok(Some((*text).to_string()))))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl ModelGateway for ScriptedGateway {
    async fn chat(&self, request: &ChatRequest) -> Result<Option<String>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .unwrap_or(Err(BotError::LlmResponse("script exhausted".to_string())))
    }
}

/// Store whose every operation fails.
pub struct BrokenStore;

impl ConversationStore for BrokenStore {
    async fn get(&self, _channel_id: &str) -> Result<Option<Vec<Message>>> {
        Err(BotError::Store("unreachable".to_string()))
    }

    async fn set(&self, _channel_id: &str, _messages: &[Message]) -> Result<()> {
        Err(BotError::Store("unreachable".to_string()))
    }

    async fn delete(&self, _channel_id: &str) -> Result<()> {
        Err(BotError::Store("unreachable".to_string()))
    }
}
