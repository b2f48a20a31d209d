//! Book index: where each book's document lives.
//!
//! The index document is a JSON object mapping book names to locations:
//!
//! ```json
//! { "genesis": "ot/01-genesis.json", "1 John": "nt/62-1john.json" }
//! ```
//!
//! Books without an entry resolve to `"<book>.json"`, so a missing or
//! malformed index degrades to that naming rule instead of failing.

use std::collections::HashMap;

use anyhow::anyhow;
use serde_json::Value;

use crate::error::CorpusError;
use crate::models::BookId;
use crate::source::DocumentSource;

/// Default location of the index document within a source.
pub const DEFAULT_INDEX_LOCATION: &str = "index.json";

/// Maps [`BookId`]s to storage locations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookIndex {
    entries: HashMap<BookId, String>,
}

impl BookIndex {
    /// An index with no entries; every book uses the fallback location.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse an index document.
    ///
    /// Keys that are not canonical book names are skipped with a warning.
    /// A document that is not an object of strings is rejected.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let object = value
            .as_object()
            .ok_or_else(|| anyhow!("index must be a JSON object"))?;

        let mut entries = HashMap::with_capacity(object.len());
        for (name, location) in object {
            let location = location
                .as_str()
                .ok_or_else(|| anyhow!("index entry {:?} is not a string", name))?;
            match BookId::parse(name) {
                Some(book) => {
                    entries.insert(book, location.to_string());
                }
                None => tracing::warn!(entry = %name, "skipping unknown book in index"),
            }
        }

        Ok(Self { entries })
    }

    /// Fetch and parse the index, propagating the failure.
    pub async fn try_load<S: DocumentSource + ?Sized>(
        source: &S,
        location: &str,
    ) -> Result<Self, CorpusError> {
        let text = source
            .fetch(location)
            .await
            .map_err(|reason| CorpusError::IndexLoad {
                location: location.to_string(),
                reason,
            })?;
        Self::from_json(&text).map_err(|reason| CorpusError::IndexLoad {
            location: location.to_string(),
            reason,
        })
    }

    /// Fetch and parse the index, degrading to the empty index on failure.
    pub async fn load<S: DocumentSource + ?Sized>(source: &S, location: &str) -> Self {
        match Self::try_load(source, location).await {
            Ok(index) => {
                tracing::debug!(entries = index.len(), "loaded book index");
                index
            }
            Err(e) => {
                tracing::warn!(error = %e, "using fallback book locations");
                Self::empty()
            }
        }
    }

    pub fn insert(&mut self, book: BookId, location: impl Into<String>) {
        self.entries.insert(book, location.into());
    }

    /// Location of `book`: the mapped entry or `"<book>.json"`.
    pub fn resolve_location(&self, book: BookId) -> String {
        self.entries
            .get(&book)
            .cloned()
            .unwrap_or_else(|| fallback_location(book))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The deterministic per-book naming rule.
pub fn fallback_location(book: BookId) -> String {
    format!("{}.json", book.as_str())
}
