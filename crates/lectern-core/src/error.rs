//! Error types for the Lectern core.
//!
//! Nothing in this crate is fatal: every error here describes a degraded
//! state (a book that could not be loaded, a chapter that does not exist)
//! that the presentation layer decides how to surface.

use thiserror::Error;

use crate::models::{BookId, ChapterNumber, VerseNumber};

/// A book name that is not one of the canonical [`BookId`]s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown book: {0}")]
pub struct UnknownBook(pub String);

/// A book document that failed validation.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("chapter key {0:?} is not a positive integer")]
    InvalidChapterKey(String),

    #[error("chapter {chapter}: verse key {key:?} is not a positive integer")]
    InvalidVerseKey { chapter: ChapterNumber, key: String },

    #[error("chapter {0} appears more than once")]
    DuplicateChapter(ChapterNumber),

    #[error("chapter {chapter}: verse {verse} appears more than once")]
    DuplicateVerse {
        chapter: ChapterNumber,
        verse: VerseNumber,
    },
}

/// Failures while loading the book index or a book document.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// The index document was unreachable or malformed.
    #[error("failed to load book index from {location}: {reason:#}")]
    IndexLoad {
        location: String,
        reason: anyhow::Error,
    },

    /// The book document could not be fetched.
    #[error("failed to fetch {book} from {location}: {reason:#}")]
    Fetch {
        book: BookId,
        location: String,
        reason: anyhow::Error,
    },

    /// The book document was fetched but did not validate.
    #[error("failed to parse {book} ({location}): {source}")]
    Parse {
        book: BookId,
        location: String,
        source: DocumentError,
    },
}

/// Navigation requests that could not be satisfied.
///
/// The current position is left unchanged whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("could not load {0}")]
    BookUnavailable(BookId),

    #[error("{book} {chapter}: chapter not available")]
    ChapterUnavailable { book: BookId, chapter: ChapterNumber },
}
