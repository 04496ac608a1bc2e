use async_trait::async_trait;
use landwarn_core::StoreError;

pub mod memory;
pub mod sqlite;

pub use memory::MemorySeenStore;
pub use sqlite::SqliteSeenStore;

/// Storage key the seen-id set lives under. Every client of the alert feed
/// uses the same key, so a rebuilt database resumes the same set.
pub const SEEN_IDS_KEY: &str = "seen_notification_ids";

/// Durable membership set of notification ids that have already been
/// delivered. An id present here must never produce another alert.
#[async_trait]
pub trait SeenStore: Send + Sync {
    async fn contains(&self, notification_id: &str) -> Result<bool, StoreError>;

    /// Records one id. Returns whether the id was newly inserted; inserting
    /// an id that is already present is a no-op.
    async fn insert(&self, notification_id: &str) -> Result<bool, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;
}
