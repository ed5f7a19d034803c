use std::sync::Arc;

use tracing::debug;

use coach_core::model::{ConversationId, ConversationRecord};
use storage::repository::{KeyValueStore, KeyValueStoreExt, StorageError};

use crate::keys;

/// Default number of dialogues kept.
pub const DEFAULT_CAPACITY: usize = 50;

/// Capped, most-recent-first history of dialogues.
///
/// The whole history lives under a single key as a JSON array. Every mutation
/// is a read-modify-write that completes on the storage port before
/// returning; concurrent writers race and the last one wins.
#[derive(Clone)]
pub struct ConversationSessionStore {
    kv: Arc<dyn KeyValueStore>,
    capacity: usize,
}

impl ConversationSessionStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_capacity(kv, DEFAULT_CAPACITY)
    }

    /// A store keeping at most `capacity` records (at least one).
    #[must_use]
    pub fn with_capacity(kv: Arc<dyn KeyValueStore>, capacity: usize) -> Self {
        Self {
            kv,
            capacity: capacity.max(1),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Every stored record, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be read or decoded.
    pub async fn list_all(&self) -> Result<Vec<ConversationRecord>, StorageError> {
        Ok(self
            .kv
            .get_json(keys::CONVERSATION_HISTORY)
            .await?
            .unwrap_or_default())
    }

    /// Records for `scenario`, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be read or decoded.
    pub async fn list(&self, scenario: &str) -> Result<Vec<ConversationRecord>, StorageError> {
        let scenario = scenario.trim();
        let mut records = self.list_all().await?;
        records.retain(|record| record.scenario == scenario);
        Ok(records)
    }

    /// The most recent record for `scenario`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be read or decoded.
    pub async fn latest(&self, scenario: &str) -> Result<Option<ConversationRecord>, StorageError> {
        Ok(self.list(scenario).await?.into_iter().next())
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be read or decoded.
    pub async fn get(&self, id: &ConversationId) -> Result<Option<ConversationRecord>, StorageError> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .find(|record| &record.id == id))
    }

    /// Save `record` as the most recent entry, replacing any record with the
    /// same id and evicting the oldest beyond capacity.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be read or written.
    pub async fn upsert(&self, record: ConversationRecord) -> Result<(), StorageError> {
        let mut records = self.list_all().await?;
        records.retain(|existing| existing.id != record.id);
        records.insert(0, record);
        let evicted = records.len().saturating_sub(self.capacity);
        records.truncate(self.capacity);
        self.kv
            .set_json(keys::CONVERSATION_HISTORY, &records)
            .await?;
        debug!(count = records.len(), evicted, "saved conversation history");
        Ok(())
    }

    /// Remove the record with `id`. Returns false if none existed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be read or written.
    pub async fn delete(&self, id: &ConversationId) -> Result<bool, StorageError> {
        let mut records = self.list_all().await?;
        let before = records.len();
        records.retain(|record| &record.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.kv
            .set_json(keys::CONVERSATION_HISTORY, &records)
            .await?;
        debug!(%id, "deleted conversation");
        Ok(true)
    }

    /// Drop the whole history.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the key cannot be removed.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.kv.remove(keys::CONVERSATION_HISTORY).await
    }
}
