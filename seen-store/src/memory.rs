use async_trait::async_trait;
use landwarn_core::StoreError;
use std::collections::HashSet;
use tokio::sync::RwLock;

use crate::SeenStore;

/// In-memory seen set. Nothing survives a restart; meant for tests and
/// one-shot tooling.
#[derive(Debug, Default)]
pub struct MemorySeenStore {
    ids: RwLock<HashSet<String>>,
}

impl MemorySeenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeenStore for MemorySeenStore {
    async fn contains(&self, notification_id: &str) -> Result<bool, StoreError> {
        Ok(self.ids.read().await.contains(notification_id))
    }

    async fn insert(&self, notification_id: &str) -> Result<bool, StoreError> {
        Ok(self.ids.write().await.insert(notification_id.to_string()))
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.ids.read().await.len() as u64)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.ids.write().await.clear();
        Ok(())
    }
}
