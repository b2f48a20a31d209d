//! Reading position and chapter-to-chapter navigation.
//!
//! The [`Navigator`] tracks the current book and chapter, loads books on
//! demand through the [`CorpusStore`], and persists every successful move
//! to a [`KeyValueStore`] so the position survives restarts.
//!
//! Previous/next stepping walks the current book's available chapters in
//! ascending order. Chapter sets may be sparse; stepping past the first or
//! last available chapter is a no-op rather than an error or a wrap-around.

use std::sync::Arc;

use crate::corpus::CorpusStore;
use crate::error::NavigationError;
use crate::kv::KeyValueStore;
use crate::models::{BookId, Chapter, ChapterNumber, NavigationPosition};
use crate::preferences::{LAST_VIEWED_BOOK, LAST_VIEWED_CHAPTER};

pub struct Navigator {
    corpus: Arc<CorpusStore>,
    kv: Arc<dyn KeyValueStore>,
    current: NavigationPosition,
}

impl Navigator {
    /// Restore the last persisted position, or start at `default`.
    ///
    /// Loads the starting book before returning so the first chapter can be
    /// shown after a single fetch.
    pub async fn restore(
        corpus: Arc<CorpusStore>,
        kv: Arc<dyn KeyValueStore>,
        default: NavigationPosition,
    ) -> Self {
        let current = load_position(kv.as_ref()).await.unwrap_or(default);
        if !corpus.ensure_loaded(current.book).await {
            tracing::warn!(position = %current, "starting book is unavailable");
        }
        Self {
            corpus,
            kv,
            current,
        }
    }

    pub fn current_position(&self) -> NavigationPosition {
        self.current
    }

    /// Verses at the current position, if that chapter is available.
    pub fn current_chapter(&self) -> Option<&Chapter> {
        self.corpus
            .get_chapter(self.current.book, self.current.chapter)
    }

    pub fn corpus(&self) -> &Arc<CorpusStore> {
        &self.corpus
    }

    /// Move to `book` `chapter`, loading the book if needed.
    ///
    /// The position is only changed (and persisted) when the chapter exists.
    pub async fn go_to(
        &mut self,
        book: BookId,
        chapter: ChapterNumber,
    ) -> Result<NavigationPosition, NavigationError> {
        if !self.corpus.ensure_loaded(book).await {
            return Err(NavigationError::BookUnavailable(book));
        }
        if self.corpus.get_chapter(book, chapter).is_none() {
            return Err(NavigationError::ChapterUnavailable { book, chapter });
        }

        self.current = NavigationPosition::new(book, chapter);
        self.persist().await;
        Ok(self.current)
    }

    /// Move to the first available chapter of `book`.
    pub async fn go_to_book(&mut self, book: BookId) -> Result<NavigationPosition, NavigationError> {
        if !self.corpus.ensure_loaded(book).await {
            return Err(NavigationError::BookUnavailable(book));
        }
        let first = self
            .corpus
            .chapters(book)
            .first()
            .copied()
            .ok_or(NavigationError::ChapterUnavailable { book, chapter: 1 })?;
        self.go_to(book, first).await
    }

    /// Step to the next available chapter of the current book.
    ///
    /// Returns `Ok(None)` when already at the last chapter.
    pub async fn next_chapter(&mut self) -> Result<Option<NavigationPosition>, NavigationError> {
        let chapters = self.available_chapters().await?;
        match chapters.into_iter().find(|c| *c > self.current.chapter) {
            Some(target) => self.go_to(self.current.book, target).await.map(Some),
            None => Ok(None),
        }
    }

    /// Step to the previous available chapter of the current book.
    ///
    /// Returns `Ok(None)` when already at the first chapter.
    pub async fn prev_chapter(&mut self) -> Result<Option<NavigationPosition>, NavigationError> {
        let chapters = self.available_chapters().await?;
        match chapters.into_iter().rev().find(|c| *c < self.current.chapter) {
            Some(target) => self.go_to(self.current.book, target).await.map(Some),
            None => Ok(None),
        }
    }

    async fn available_chapters(&self) -> Result<Vec<ChapterNumber>, NavigationError> {
        let book = self.current.book;
        if !self.corpus.ensure_loaded(book).await {
            return Err(NavigationError::BookUnavailable(book));
        }
        Ok(self.corpus.chapters(book))
    }

    async fn persist(&self) {
        let chapter = self.current.chapter.to_string();
        let saved = async {
            self.kv.set(LAST_VIEWED_BOOK, self.current.book.as_str()).await?;
            self.kv.set(LAST_VIEWED_CHAPTER, &chapter).await
        }
        .await;
        if let Err(e) = saved {
            tracing::warn!(position = %self.current, error = %e, "failed to persist position");
        }
    }
}

/// Read the persisted position. Missing or invalid entries yield `None`.
pub async fn load_position(kv: &dyn KeyValueStore) -> Option<NavigationPosition> {
    let read = async {
        let book = kv.get(LAST_VIEWED_BOOK).await?;
        let chapter = kv.get(LAST_VIEWED_CHAPTER).await?;
        anyhow::Ok((book, chapter))
    }
    .await;

    let (book, chapter) = match read {
        Ok((Some(book), Some(chapter))) => (book, chapter),
        Ok(_) => return None,
        Err(e) => {
            tracing::warn!(error = %e, "could not read persisted position");
            return None;
        }
    };

    let parsed_book = BookId::parse(&book);
    let parsed_chapter = chapter.trim().parse::<ChapterNumber>().ok().filter(|c| *c > 0);
    match (parsed_book, parsed_chapter) {
        (Some(book), Some(chapter)) => Some(NavigationPosition::new(book, chapter)),
        _ => {
            tracing::warn!(%book, %chapter, "ignoring invalid persisted position");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::BookIndex;
    use crate::kv::InMemoryKv;
    use crate::source::memory::InMemorySource;

    fn book(name: &str) -> BookId {
        BookId::parse(name).unwrap()
    }

    fn corpus() -> Arc<CorpusStore> {
        let source = InMemorySource::new()
            .with(
                "matthew.json",
                r#"{"1": {"1": "The book of the generation"}, "2": {"1": "Now when Jesus was born"},
                    "3": {"1": "In those days came John the Baptist"}}"#,
            )
            .with(
                "psalms.json",
                r#"{"1": {"1": "Blessed is the man"}, "23": {"1": "The LORD is my shepherd"},
                    "150": {"1": "Praise ye the LORD"}}"#,
            );
        Arc::new(CorpusStore::new(source, BookIndex::empty()))
    }

    fn default_position() -> NavigationPosition {
        NavigationPosition::new(book("matthew"), 1)
    }

    #[tokio::test]
    async fn starts_at_default_without_persisted_state() {
        let nav = Navigator::restore(corpus(), Arc::new(InMemoryKv::new()), default_position()).await;
        assert_eq!(nav.current_position(), default_position());
        assert!(nav.current_chapter().is_some());
    }

    #[tokio::test]
    async fn position_survives_restart() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(InMemoryKv::new());
        let mut nav = Navigator::restore(corpus(), kv.clone(), default_position()).await;
        nav.go_to(book("psalms"), 23).await.unwrap();

        let restarted = Navigator::restore(corpus(), kv, default_position()).await;
        assert_eq!(
            restarted.current_position(),
            NavigationPosition::new(book("psalms"), 23)
        );
    }

    #[tokio::test]
    async fn invalid_persisted_state_falls_back() {
        let kv = Arc::new(InMemoryKv::new());
        kv.set(LAST_VIEWED_BOOK, "narnia").await.unwrap();
        kv.set(LAST_VIEWED_CHAPTER, "2").await.unwrap();
        let nav = Navigator::restore(corpus(), kv.clone(), default_position()).await;
        assert_eq!(nav.current_position(), default_position());

        kv.set(LAST_VIEWED_BOOK, "psalms").await.unwrap();
        kv.set(LAST_VIEWED_CHAPTER, "x").await.unwrap();
        assert!(load_position(kv.as_ref()).await.is_none());
    }

    #[tokio::test]
    async fn go_to_rejects_missing_chapter_and_book() {
        let kv = Arc::new(InMemoryKv::new());
        let mut nav = Navigator::restore(corpus(), kv.clone(), default_position()).await;

        let err = nav.go_to(book("psalms"), 2).await.unwrap_err();
        assert_eq!(
            err,
            NavigationError::ChapterUnavailable {
                book: book("psalms"),
                chapter: 2
            }
        );
        let err = nav.go_to(book("genesis"), 1).await.unwrap_err();
        assert_eq!(err, NavigationError::BookUnavailable(book("genesis")));

        assert_eq!(nav.current_position(), default_position());
        assert!(kv.get(LAST_VIEWED_BOOK).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn next_and_prev_clamp_at_bounds() {
        let mut nav =
            Navigator::restore(corpus(), Arc::new(InMemoryKv::new()), default_position()).await;

        assert_eq!(nav.prev_chapter().await.unwrap(), None);
        assert_eq!(nav.current_position().chapter, 1);

        assert_eq!(nav.next_chapter().await.unwrap().map(|p| p.chapter), Some(2));
        assert_eq!(nav.next_chapter().await.unwrap().map(|p| p.chapter), Some(3));
        assert_eq!(nav.next_chapter().await.unwrap(), None);
        assert_eq!(nav.current_position().chapter, 3);

        assert_eq!(nav.prev_chapter().await.unwrap().map(|p| p.chapter), Some(2));
    }

    #[tokio::test]
    async fn stepping_skips_gaps_in_sparse_books() {
        let mut nav =
            Navigator::restore(corpus(), Arc::new(InMemoryKv::new()), default_position()).await;
        nav.go_to(book("psalms"), 23).await.unwrap();

        assert_eq!(nav.next_chapter().await.unwrap().map(|p| p.chapter), Some(150));
        assert_eq!(nav.next_chapter().await.unwrap(), None);
        assert_eq!(nav.prev_chapter().await.unwrap().map(|p| p.chapter), Some(23));
        assert_eq!(nav.prev_chapter().await.unwrap().map(|p| p.chapter), Some(1));
        assert_eq!(nav.prev_chapter().await.unwrap(), None);
    }

    #[tokio::test]
    async fn go_to_book_selects_first_chapter() {
        let kv = Arc::new(InMemoryKv::new());
        let mut nav = Navigator::restore(corpus(), kv.clone(), default_position()).await;
        let pos = nav.go_to_book(book("psalms")).await.unwrap();
        assert_eq!(pos, NavigationPosition::new(book("psalms"), 1));
        assert_eq!(kv.get(LAST_VIEWED_BOOK).await.unwrap().as_deref(), Some("psalms"));
        assert_eq!(kv.get(LAST_VIEWED_CHAPTER).await.unwrap().as_deref(), Some("1"));
    }
}
