//! In-memory [`DocumentSource`] for testing and WASM targets.
//!
//! Documents live in a `HashMap` behind `std::sync::RwLock`. Every fetch is
//! counted per location so callers can assert on cache behaviour, and
//! locations can be marked as failing to simulate transport errors.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use super::DocumentSource;

/// In-memory document source.
pub struct InMemorySource {
    documents: RwLock<HashMap<String, String>>,
    failing: RwLock<HashSet<String>>,
    fetches: RwLock<HashMap<String, usize>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            failing: RwLock::new(HashSet::new()),
            fetches: RwLock::new(HashMap::new()),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(self, location: &str, body: &str) -> Self {
        self.insert(location, body);
        self
    }

    /// Store `body` at `location`, replacing anything already there.
    pub fn insert(&self, location: &str, body: &str) {
        let mut docs = self.documents.write().unwrap_or_else(|e| e.into_inner());
        docs.insert(location.to_string(), body.to_string());
    }

    /// Make fetches of `location` fail (or succeed again) regardless of content.
    pub fn set_failing(&self, location: &str, failing: bool) {
        let mut set = self.failing.write().unwrap_or_else(|e| e.into_inner());
        if failing {
            set.insert(location.to_string());
        } else {
            set.remove(location);
        }
    }

    /// Number of fetch attempts made for `location`.
    pub fn fetch_count(&self, location: &str) -> usize {
        let fetches = self.fetches.read().unwrap_or_else(|e| e.into_inner());
        fetches.get(location).copied().unwrap_or(0)
    }

    /// Total fetch attempts across all locations.
    pub fn total_fetches(&self) -> usize {
        let fetches = self.fetches.read().unwrap_or_else(|e| e.into_inner());
        fetches.values().sum()
    }
}

impl Default for InMemorySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentSource for InMemorySource {
    async fn fetch(&self, location: &str) -> Result<String> {
        {
            let mut fetches = self.fetches.write().unwrap_or_else(|e| e.into_inner());
            *fetches.entry(location.to_string()).or_insert(0) += 1;
        }

        if self
            .failing
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(location)
        {
            bail!("simulated failure for {}", location);
        }

        let docs = self.documents.read().unwrap_or_else(|e| e.into_inner());
        docs.get(location)
            .cloned()
            .ok_or_else(|| anyhow!("not found: {}", location))
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
