use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{StoreError, Storage};

/// [`Storage`] backed by an in-process ordered map. Contents are lost when
/// the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage(RwLock<BTreeMap<String, Vec<u8>>>);

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.0.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.0.write().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool, StoreError> {
        let mut entries = self.0.write().await;
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_owned(), value);
        Ok(true)
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let entries = self.0.read().await;
        Ok(entries
            .range(prefix.to_owned()..)
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(prefix))
            .map(|key| key[prefix.len()..].to_owned())
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.0.write().await.remove(key);
        Ok(())
    }
}
