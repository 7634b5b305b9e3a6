//! Per-channel serialization of conversation updates.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per channel so read-modify-write cycles on a channel's
/// history never interleave. Unused entries are pruned on each acquire.
#[derive(Debug, Default)]
pub struct ChannelLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ChannelLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, channel_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|key, lock| key == channel_id || Arc::strong_count(lock) > 1);
            Arc::clone(
                locks
                    .entry(channel_id.to_string())
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_channel_waits() {
        let locks = ChannelLocks::new();
        let _held = locks.lock("C1").await;

        let second = tokio::time::timeout(Duration::from_millis(50), locks.lock("C1")).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn other_channels_proceed() {
        let locks = ChannelLocks::new();
        let _held = locks.lock("C1").await;

        let other = tokio::time::timeout(Duration::from_millis(50), locks.lock("C2")).await;
        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn released_channels_are_pruned() {
        let locks = ChannelLocks::new();
        drop(locks.lock("C1").await);
        drop(locks.lock("C2").await);

        let tracked = locks.locks.lock().unwrap_or_else(PoisonError::into_inner);
        assert_eq!(tracked.len(), 1);
        assert!(tracked.contains_key("C2"));
    }
}
