//! In-process conversation store.

use std::collections::HashMap;

use log::debug;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::types::Message;

use super::{ConversationStore, StoreKey};

/// Conversation store held in memory; history is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<Message>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConversationStore for MemoryStore {
    async fn get(&self, channel_id: &str) -> Result<Option<Vec<Message>>> {
        let key = StoreKey::channel(channel_id).to_string();
        Ok(self.entries.read().await.get(&key).cloned())
    }

    async fn set(&self, channel_id: &str, messages: &[Message]) -> Result<()> {
        let key = StoreKey::channel(channel_id).to_string();
        debug!("Storing {} messages under {key}", messages.len());
        self.entries.write().await.insert(key, messages.to_vec());
        Ok(())
    }

    async fn delete(&self, channel_id: &str) -> Result<()> {
        let key = StoreKey::channel(channel_id).to_string();
        debug!("Deleting {key}");
        self.entries.write().await.remove(&key);
        Ok(())
    }
}
