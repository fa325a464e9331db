//! In-memory record store for ephemeral sessions and tests.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::ports::repository::StateRepository;

/// Volatile [`StateRepository`]; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateRepository for MemoryStore {
    async fn load(&self, name: &str) -> Result<Option<String>> {
        Ok(self.records.read().await.get(name).cloned())
    }

    async fn save(&self, name: &str, json: &str) -> Result<()> {
        self.records
            .write()
            .await
            .insert(name.to_string(), json.to_string());
        Ok(())
    }

    async fn clear(&self, name: &str) -> Result<()> {
        self.records.write().await.remove(name);
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip_and_clear() {
        let store = MemoryStore::new();
        assert!(store.load("a").await.unwrap().is_none());
        store.save("a", "1").await.unwrap();
        assert_eq!(store.load("a").await.unwrap().as_deref(), Some("1"));
        store.clear("a").await.unwrap();
        assert!(store.load("a").await.unwrap().is_none());
    }
}
