//! Per-channel conversation history storage.

mod memory;
mod s3;

use std::fmt;
use std::future::Future;

use crate::error::Result;
use crate::types::Message;

pub use memory::MemoryStore;
pub use s3::S3Store;

/// Keyed mapping from channel id to that channel's message history.
///
/// Implementations only need atomic per-key replace and delete. Nothing here
/// guards against two writers racing on one key; callers serialize per
/// channel.
pub trait ConversationStore: Send + Sync {
    fn get(&self, channel_id: &str) -> impl Future<Output = Result<Option<Vec<Message>>>> + Send;

    fn set(
        &self,
        channel_id: &str,
        messages: &[Message],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Deleting a missing key is not an error.
    fn delete(&self, channel_id: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Store key for a channel, `("channel", id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreKey<'a> {
    pub channel_id: &'a str,
}

impl<'a> StoreKey<'a> {
    #[must_use]
    pub fn channel(channel_id: &'a str) -> Self {
        Self { channel_id }
    }
}

impl fmt::Display for StoreKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel/{}", self.channel_id)
    }
}

/// Store selected at startup from configuration.
#[derive(Debug)]
pub enum StoreBackend {
    Memory(MemoryStore),
    S3(S3Store),
}

impl ConversationStore for StoreBackend {
    async fn get(&self, channel_id: &str) -> Result<Option<Vec<Message>>> {
        match self {
            StoreBackend::Memory(store) => store.get(channel_id).await,
            StoreBackend::S3(store) => store.get(channel_id).await,
        }
    }

    async fn set(&self, channel_id: &str, messages: &[Message]) -> Result<()> {
        match self {
            StoreBackend::Memory(store) => store.set(channel_id, messages).await,
            StoreBackend::S3(store) => store.set(channel_id, messages).await,
        }
    }

    async fn delete(&self, channel_id: &str) -> Result<()> {
        match self {
            StoreBackend::Memory(store) => store.delete(channel_id).await,
            StoreBackend::S3(store) => store.delete(channel_id).await,
        }
    }
}
