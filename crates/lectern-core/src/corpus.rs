//! Lazily-loaded, write-once corpus cache.
//!
//! The [`CorpusStore`] holds one cell per canonical book. A cell is filled
//! at most once, by the first successful load; it is never refetched or
//! mutated afterwards. A failed load leaves the cell empty so a later call
//! can retry.
//!
//! # Concurrency
//!
//! Loads for distinct books are independent and may run concurrently.
//! Concurrent loads of the same book are deduplicated: the first caller
//! fetches while the others wait on the same cell. Readers (search,
//! navigation) only ever see a book fully absent or fully present, so they
//! need no locking.

use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::OnceCell;

use crate::error::CorpusError;
use crate::index::BookIndex;
use crate::models::{BookDocument, BookId, Chapter, ChapterNumber, BOOK_COUNT};
use crate::source::DocumentSource;

/// Result of a [`CorpusStore::preload_all`] run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PreloadSummary {
    /// Books that were already cached when preload started.
    pub already_cached: usize,
    /// Books loaded by this run, in canonical order.
    pub loaded: Vec<BookId>,
    /// Books that failed, in canonical order, with the failure message.
    pub failed: Vec<(BookId, String)>,
}

/// Per-book progress event emitted during preload.
#[derive(Debug, Clone)]
pub struct PreloadProgress {
    pub book: BookId,
    /// `None` on success, otherwise the failure message.
    pub error: Option<String>,
    /// Books finished so far in this run (including this one).
    pub done: usize,
    /// Books this run had to fetch.
    pub total: usize,
}

/// Owns the book index, the document source, and the cached corpus.
///
/// Constructed once at startup and shared (typically behind an `Arc`) with
/// the search engine, the navigator, and the presentation layer.
pub struct CorpusStore {
    source: Box<dyn DocumentSource>,
    index: BookIndex,
    cells: Vec<OnceCell<BookDocument>>,
}

impl CorpusStore {
    /// Create a store over `source` using an already-loaded `index`.
    pub fn new(source: impl DocumentSource + 'static, index: BookIndex) -> Self {
        Self {
            source: Box::new(source),
            index,
            cells: (0..BOOK_COUNT).map(|_| OnceCell::new()).collect(),
        }
    }

    /// Load the book index from `index_location` and create the store.
    ///
    /// An unreachable or malformed index is logged and replaced by the
    /// fallback naming rule; this never fails.
    pub async fn open(source: impl DocumentSource + 'static, index_location: &str) -> Self {
        let index = BookIndex::load(&source, index_location).await;
        Self::new(source, index)
    }

    pub fn index(&self) -> &BookIndex {
        &self.index
    }

    pub fn source(&self) -> &dyn DocumentSource {
        self.source.as_ref()
    }

    /// Make sure `book` is cached. Returns `false` if it could not be loaded.
    ///
    /// A no-op returning `true` when the book is already cached.
    pub async fn ensure_loaded(&self, book: BookId) -> bool {
        match self.try_ensure_loaded(book).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(%book, error = %e, "book load failed");
                false
            }
        }
    }

    /// Like [`ensure_loaded`](Self::ensure_loaded) but returns the document
    /// or the reason it could not be loaded.
    pub async fn try_ensure_loaded(&self, book: BookId) -> Result<&BookDocument, CorpusError> {
        let cell = &self.cells[book.index()];
        if let Some(doc) = cell.get() {
            return Ok(doc);
        }
        cell.get_or_try_init(|| self.fetch_book(book)).await
    }

    async fn fetch_book(&self, book: BookId) -> Result<BookDocument, CorpusError> {
        let location = self.index.resolve_location(book);
        tracing::debug!(%book, %location, "fetching book");

        let text = match self.source.fetch(&location).await {
            Ok(text) => text,
            Err(reason) => {
                return Err(CorpusError::Fetch {
                    book,
                    location,
                    reason,
                })
            }
        };

        match BookDocument::from_json(&text) {
            Ok(doc) => {
                tracing::debug!(
                    %book,
                    chapters = doc.chapter_count(),
                    verses = doc.verse_count(),
                    "book cached"
                );
                Ok(doc)
            }
            Err(source) => Err(CorpusError::Parse {
                book,
                location,
                source,
            }),
        }
    }

    /// The cached document for `book`, if loaded.
    pub fn book(&self, book: BookId) -> Option<&BookDocument> {
        self.cells[book.index()].get()
    }

    pub fn is_loaded(&self, book: BookId) -> bool {
        self.cells[book.index()].initialized()
    }

    /// Verses of one chapter. Absent if the book is not loaded or the
    /// chapter does not exist.
    pub fn get_chapter(&self, book: BookId, chapter: ChapterNumber) -> Option<&Chapter> {
        self.book(book)?.chapter(chapter)
    }

    /// Available chapters of `book`, ascending. Empty if not loaded.
    pub fn chapters(&self, book: BookId) -> Vec<ChapterNumber> {
        self.book(book)
            .map(|doc| doc.chapter_numbers().collect())
            .unwrap_or_default()
    }

    /// Every cached book, in canonical order.
    pub fn loaded_books(&self) -> impl Iterator<Item = (BookId, &BookDocument)> {
        BookId::all().filter_map(move |book| self.book(book).map(|doc| (book, doc)))
    }

    pub fn loaded_count(&self) -> usize {
        self.cells.iter().filter(|c| c.initialized()).count()
    }

    /// Best-effort fill of every listed book that is not cached yet.
    ///
    /// Per-book failures are logged and collected in the summary; one
    /// missing book never stops the rest. `concurrency` bounds the number
    /// of fetches in flight (`1` fetches strictly one book at a time).
    pub async fn preload_all(&self, books: &[BookId], concurrency: usize) -> PreloadSummary {
        self.preload_with_progress(books, concurrency, |_| {}).await
    }

    /// [`preload_all`](Self::preload_all) with a callback per finished book.
    pub async fn preload_with_progress<F>(
        &self,
        books: &[BookId],
        concurrency: usize,
        on_progress: F,
    ) -> PreloadSummary
    where
        F: Fn(&PreloadProgress) + Sync,
    {
        let mut summary = PreloadSummary::default();
        let mut pending: Vec<BookId> = Vec::new();
        for &book in books {
            if self.is_loaded(book) {
                summary.already_cached += 1;
            } else if !pending.contains(&book) {
                pending.push(book);
            }
        }

        let total = pending.len();
        let mut done = 0;
        let mut results = stream::iter(pending)
            .map(|book| async move {
                let outcome = self.try_ensure_loaded(book).await.map(|_| ());
                (book, outcome)
            })
            .buffer_unordered(concurrency.max(1));

        while let Some((book, outcome)) = results.next().await {
            done += 1;
            let error = match outcome {
                Ok(()) => {
                    summary.loaded.push(book);
                    None
                }
                Err(e) => {
                    tracing::warn!(%book, error = %e, "preload skipped book");
                    let message = e.to_string();
                    summary.failed.push((book, message.clone()));
                    Some(message)
                }
            };
            on_progress(&PreloadProgress {
                book,
                error,
                done,
                total,
            });
        }

        summary.loaded.sort();
        summary.failed.sort_by_key(|(book, _)| *book);
        tracing::info!(
            loaded = summary.loaded.len(),
            failed = summary.failed.len(),
            cached = self.loaded_count(),
            "preload finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::memory::InMemorySource;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    fn book(name: &str) -> BookId {
        BookId::parse(name).unwrap()
    }

    fn sample_source() -> Arc<InMemorySource> {
        Arc::new(
            InMemorySource::new()
                .with("john.json", r#"{"3": {"16": "For God so loved the world"}}"#)
                .with("genesis.json", r#"{"1": {"1": "In the beginning"}}"#)
                .with("broken.json", "{ not json"),
        )
    }

    /// Delays every fetch so concurrent callers overlap.
    struct SlowSource(Arc<InMemorySource>);

    #[async_trait]
    impl DocumentSource for SlowSource {
        async fn fetch(&self, location: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.0.fetch(location).await
        }
    }

    #[tokio::test]
    async fn ensure_loaded_is_idempotent() {
        let source = sample_source();
        let store = CorpusStore::new(source.clone(), BookIndex::empty());

        assert!(store.ensure_loaded(book("john")).await);
        assert!(store.ensure_loaded(book("john")).await);
        assert_eq!(source.fetch_count("john.json"), 1);

        let chapter = store.get_chapter(book("john"), 3).unwrap();
        assert_eq!(chapter.get(&16).unwrap(), "For God so loved the world");
        assert!(store.get_chapter(book("john"), 4).is_none());
    }

    #[tokio::test]
    async fn failed_load_leaves_book_absent_and_retries() {
        let source = sample_source();
        source.set_failing("john.json", true);
        let store = CorpusStore::new(source.clone(), BookIndex::empty());

        assert!(!store.ensure_loaded(book("john")).await);
        assert!(!store.is_loaded(book("john")));
        for chapter in 1..=5 {
            assert!(store.get_chapter(book("john"), chapter).is_none());
        }
        assert!(store.chapters(book("john")).is_empty());

        source.set_failing("john.json", false);
        assert!(store.ensure_loaded(book("john")).await);
        assert_eq!(source.fetch_count("john.json"), 2);
    }

    #[tokio::test]
    async fn parse_failure_is_a_book_load_failure() {
        let source = sample_source();
        let mut index = BookIndex::empty();
        index.insert(book("mark"), "broken.json");
        let store = CorpusStore::new(source, index);

        let err = store.try_ensure_loaded(book("mark")).await.unwrap_err();
        assert!(matches!(err, CorpusError::Parse { .. }));
        assert!(!store.is_loaded(book("mark")));
    }

    #[tokio::test]
    async fn concurrent_loads_fetch_once() {
        let inner = sample_source();
        let store = CorpusStore::new(SlowSource(inner.clone()), BookIndex::empty());

        let (a, b, c) = tokio::join!(
            store.ensure_loaded(book("john")),
            store.ensure_loaded(book("john")),
            store.ensure_loaded(book("john")),
        );
        assert!(a && b && c);
        assert_eq!(inner.fetch_count("john.json"), 1);
    }

    #[tokio::test]
    async fn index_locations_are_used() {
        let source = Arc::new(
            InMemorySource::new()
                .with("index.json", r#"{"john": "nt/john.json"}"#)
                .with("nt/john.json", r#"{"1": {"1": "In the beginning was the Word"}}"#),
        );
        let store = CorpusStore::open(source.clone(), "index.json").await;
        assert!(store.ensure_loaded(book("john")).await);
        assert_eq!(source.fetch_count("nt/john.json"), 1);
        assert_eq!(source.fetch_count("john.json"), 0);
    }

    #[tokio::test]
    async fn preload_skips_missing_books() {
        let source = sample_source();
        let store = CorpusStore::new(source.clone(), BookIndex::empty());
        assert!(store.ensure_loaded(book("john")).await);

        let books = [book("genesis"), book("exodus"), book("john")];
        let events = std::sync::Mutex::new(Vec::new());
        let summary = store
            .preload_with_progress(&books, 1, |p| {
                events.lock().unwrap().push((p.book, p.error.is_some(), p.done, p.total))
            })
            .await;

        assert_eq!(summary.already_cached, 1);
        assert_eq!(summary.loaded, vec![book("genesis")]);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, book("exodus"));
        assert_eq!(source.fetch_count("john.json"), 1);

        let events = events.into_inner().unwrap();
        assert_eq!(
            events,
            vec![
                (book("genesis"), false, 1, 2),
                (book("exodus"), true, 2, 2)
            ]
        );
    }

    #[tokio::test]
    async fn parallel_preload_loads_everything_available() {
        let inner = sample_source();
        let store = CorpusStore::new(SlowSource(inner.clone()), BookIndex::empty());

        let all: Vec<BookId> = BookId::all().collect();
        let summary = store.preload_all(&all, 8).await;
        assert_eq!(summary.loaded, vec![book("genesis"), book("john")]);
        assert_eq!(summary.failed.len(), 64);
        assert_eq!(store.loaded_count(), 2);

        // Nothing left to fetch for the loaded books.
        let again = store.preload_all(&[book("genesis"), book("john")], 8).await;
        assert_eq!(again.already_cached, 2);
        assert_eq!(inner.fetch_count("genesis.json"), 1);
    }

    #[tokio::test]
    async fn loaded_books_follow_canonical_order() {
        let store = CorpusStore::new(sample_source(), BookIndex::empty());
        store.ensure_loaded(book("john")).await;
        store.ensure_loaded(book("genesis")).await;
        let order: Vec<&str> = store.loaded_books().map(|(b, _)| b.as_str()).collect();
        assert_eq!(order, vec!["genesis", "john"]);
    }
}
