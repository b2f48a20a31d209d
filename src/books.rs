//! Book listing.
//!
//! Shared by `lectern books` and `GET /books`.

use anyhow::Result;
use serde::Serialize;

use lectern_core::corpus::CorpusStore;
use lectern_core::models::{BookId, Testament};

use crate::progress::ProgressMode;
use crate::reader::Reader;

#[derive(Debug, Clone, Serialize)]
pub struct BookInfo {
    pub book: BookId,
    pub title: &'static str,
    pub testament: Testament,
    /// Where the book document is fetched from, relative to the corpus root.
    pub location: String,
    pub loaded: bool,
    /// Number of chapters, once loaded.
    pub chapters: Option<usize>,
}

/// All 66 books in canonical order with their cache state.
pub fn book_listing(corpus: &CorpusStore) -> Vec<BookInfo> {
    BookId::all()
        .map(|book| {
            let doc = corpus.book(book);
            BookInfo {
                book,
                title: book.title(),
                testament: book.testament(),
                location: corpus.index().resolve_location(book),
                loaded: doc.is_some(),
                chapters: doc.map(|d| d.chapter_count()),
            }
        })
        .collect()
}

/// `lectern books`: print the book table. With `check`, load every book first
/// so the table shows which documents are actually reachable.
pub async fn run_books(reader: &Reader, check: bool, progress: ProgressMode) -> Result<()> {
    let summary = if check {
        Some(reader.preload(progress.reporter().as_ref()).await)
    } else {
        None
    };

    println!(
        "{:<16} {:<4} {:<28} CHAPTERS",
        "BOOK", "", "LOCATION"
    );
    for info in book_listing(&reader.corpus) {
        let testament = match info.testament {
            Testament::Old => "OT",
            Testament::New => "NT",
        };
        let chapters = match (info.chapters, check) {
            (Some(n), _) => n.to_string(),
            (None, true) => "UNAVAILABLE".to_string(),
            (None, false) => "-".to_string(),
        };
        println!(
            "{:<16} {:<4} {:<28} {}",
            info.book, testament, info.location, chapters
        );
    }

    if let Some(summary) = summary {
        println!();
        println!(
            "{} loaded, {} unavailable",
            reader.corpus.loaded_count(),
            summary.failed.len()
        );
    }
    Ok(())
}
