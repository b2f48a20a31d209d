//! Chapter display and navigation commands.
//!
//! Backs `lectern read`, `lectern goto`, `lectern next` and `lectern prev`.
//! Every successful move is persisted by the [`Navigator`], so the next
//! invocation resumes where this one left off.
//!
//! [`Navigator`]: lectern_core::navigation::Navigator

use anyhow::{bail, Result};

use lectern_core::models::{BookId, ChapterNumber, NavigationPosition};

use crate::reader::Reader;

/// Direction for [`run_step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Next,
    Prev,
}

/// Parse a user-supplied book name, listing the accepted forms on failure.
pub fn parse_book(name: &str) -> Result<BookId> {
    match BookId::parse(name) {
        Some(book) => Ok(book),
        None => bail!(
            "unknown book: {}. Run `lectern books` to list book names.",
            name
        ),
    }
}

/// Show a chapter, moving there first when a book (and chapter) is given.
///
/// With no arguments the current position is shown. With only a book the
/// reader jumps to its first available chapter.
pub async fn run_read(
    reader: &mut Reader,
    book: Option<&str>,
    chapter: Option<ChapterNumber>,
) -> Result<()> {
    let position = match (book, chapter) {
        (Some(book), Some(chapter)) => reader.navigator.go_to(parse_book(book)?, chapter).await?,
        (Some(book), None) => reader.navigator.go_to_book(parse_book(book)?).await?,
        (None, _) => reader.navigator.current_position(),
    };
    print_chapter(reader, position)
}

/// Step one chapter forward or back and show where the reader ended up.
///
/// Stepping past either end of the book leaves the position unchanged.
pub async fn run_step(reader: &mut Reader, step: Step) -> Result<()> {
    let moved = match step {
        Step::Next => reader.navigator.next_chapter().await?,
        Step::Prev => reader.navigator.prev_chapter().await?,
    };
    let position = reader.navigator.current_position();
    if moved.is_none() {
        let end = match step {
            Step::Next => "last",
            Step::Prev => "first",
        };
        eprintln!(
            "Already at the {} chapter of {}.",
            end,
            position.book.title()
        );
    }
    print_chapter(reader, position)
}

fn print_chapter(reader: &Reader, position: NavigationPosition) -> Result<()> {
    let verses = match reader.corpus.get_chapter(position.book, position.chapter) {
        Some(verses) => verses,
        None => bail!("{}: chapter not available", position),
    };

    let chapters = reader.corpus.chapters(position.book);
    let ordinal = chapters
        .iter()
        .position(|c| *c == position.chapter)
        .map(|i| i + 1)
        .unwrap_or(0);

    println!(
        "--- {} ({} of {}) ---",
        position,
        ordinal,
        chapters.len()
    );
    println!();
    for (verse, text) in verses {
        println!("{:>3}  {}", verse, text);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_book_accepts_titles_and_rejects_unknown_names() {
        assert_eq!(parse_book("Song of Solomon").unwrap().as_str(), "songofsolomon");
        let err = parse_book("maccabees").unwrap_err();
        assert!(err.to_string().contains("unknown book: maccabees"));
    }
}
