//! Durable key-value storage abstraction.
//!
//! The last viewed position and the theme preference are stored as plain
//! string entries. The application crate backs this with SQLite; the
//! in-memory implementation here is used in tests and WASM builds.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

/// A string key-value store that survives process restarts.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory [`KeyValueStore`].
#[derive(Default)]
pub struct InMemoryKv {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
