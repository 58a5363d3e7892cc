use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::article::ArticleRecord;
use crate::error::FeedError;
use crate::storage::SharedStore;

/// Key holding the pending batch (JSON array of records).
pub const NEWS_KEY: &str = "news";
/// Key holding the pinned record, absent when nothing is pinned.
pub const PINNED_KEY: &str = "pinnedNews";

/// Typed access to the two keys the reader keeps in its store.
#[derive(Clone)]
pub struct FeedData {
    store: SharedStore,
}

impl FeedData {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    // Corrupted values read as absent; the next write replaces them.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, FeedError> {
        let Some(bytes) = self.store.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_slice::<T>(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "stored value is not valid JSON, ignoring it");
                Ok(None)
            }
        }
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), FeedError> {
        let bytes = serde_json::to_vec(value)?;
        self.store.set(key, bytes).await?;
        Ok(())
    }

    pub async fn load_batch(&self) -> Result<Option<Vec<ArticleRecord>>, FeedError> {
        self.read_json(NEWS_KEY).await
    }

    pub async fn save_batch(&self, batch: &[ArticleRecord]) -> Result<(), FeedError> {
        self.write_json(NEWS_KEY, batch).await?;
        debug!(len = batch.len(), "pending batch saved");
        Ok(())
    }

    /// The pinned record, if any. A stored placeholder counts as no pin.
    pub async fn load_pin(&self) -> Result<Option<ArticleRecord>, FeedError> {
        let pin: Option<ArticleRecord> = self.read_json(PINNED_KEY).await?;
        Ok(pin.filter(|record| !record.is_placeholder()))
    }

    pub async fn save_pin(&self, record: &ArticleRecord) -> Result<(), FeedError> {
        self.write_json(PINNED_KEY, record).await
    }

    pub async fn clear_pin(&self) -> Result<(), FeedError> {
        self.store.delete(PINNED_KEY).await?;
        Ok(())
    }
}
