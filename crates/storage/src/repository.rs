use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Flat string-keyed persistence port.
///
/// Values are opaque strings (services store JSON). Every call is durable
/// once the returned future resolves; there is no batching and the last
/// writer wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// All keys currently stored, sorted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// JSON helpers on top of any `KeyValueStore`.
#[async_trait]
pub trait KeyValueStoreExt: KeyValueStore {
    /// Fetch and deserialize the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored value is not valid
    /// JSON for `T`, or any backend error.
    async fn get_json<T>(&self, key: &str) -> Result<Option<T>, StorageError>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StorageError::Serialization(format!("{key}: {e}"))),
            None => Ok(None),
        }
    }

    /// Serialize `value` as JSON and store it under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if `value` cannot be encoded, or
    /// any backend error.
    async fn set_json<T>(&self, key: &str, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + Sync,
    {
        let raw = serde_json::to_string(value)
            .map_err(|e| StorageError::Serialization(format!("{key}: {e}")))?;
        self.set(key, &raw).await
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.keys().cloned().collect())
    }
}

/// The storage port behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub kv: Arc<dyn KeyValueStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            kv: Arc::new(InMemoryStore::new()),
        }
    }
}
