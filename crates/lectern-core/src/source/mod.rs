//! Document source abstraction for Lectern.
//!
//! The [`DocumentSource`] trait is the only way the core reaches the
//! outside world: the book index and every book document are fetched as
//! raw text from a location string (a relative path or URL). Pluggable
//! backends (filesystem directory, HTTP base URL, in-memory) implement it.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Abstract fetcher for index and book documents.
///
/// Fetches run to completion or failure; there is no cancellation and the
/// core enforces no timeout. Implementations rely on their transport's
/// own timeout behaviour.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch the raw text stored at `location`.
    async fn fetch(&self, location: &str) -> Result<String>;

    /// Short human-readable description of where documents come from.
    fn describe(&self) -> String {
        "custom".to_string()
    }
}

#[async_trait]
impl<T: DocumentSource + ?Sized> DocumentSource for Box<T> {
    async fn fetch(&self, location: &str) -> Result<String> {
        (**self).fetch(location).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[async_trait]
impl<T: DocumentSource + ?Sized> DocumentSource for Arc<T> {
    async fn fetch(&self, location: &str) -> Result<String> {
        (**self).fetch(location).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
