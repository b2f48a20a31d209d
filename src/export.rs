//! Citation export for selected verses.
//!
//! Produces the clipboard text for a verse selection:
//!
//! ```text
//! John 3:16, 17
//!
//! 16. For God so loved the world…
//! 17. For God sent not his Son…
//!
//! — RSB VERSION BY TANQUE JERRY —
//! ```
//!
//! Verses are always listed in ascending numeric order regardless of the
//! order they were selected in.

use anyhow::{bail, Result};
use serde::Serialize;

use lectern_core::corpus::CorpusStore;
use lectern_core::error::NavigationError;
use lectern_core::models::{BookId, Chapter, ChapterNumber, VerseNumber};

use crate::reader::Reader;

#[derive(Debug, Clone, Serialize)]
pub struct Citation {
    /// Reference line, e.g. `"John 3:16, 17"`.
    pub reference: String,
    /// Full clipboard text including the attribution.
    pub text: String,
}

/// Format a citation for `selected` verses of one chapter.
pub fn format_citation(
    book: BookId,
    chapter: ChapterNumber,
    verses: &Chapter,
    selected: &[VerseNumber],
    attribution: &str,
) -> Result<Citation> {
    if selected.is_empty() {
        bail!("no verses selected");
    }

    let mut numbers: Vec<VerseNumber> = selected.to_vec();
    numbers.sort_unstable();
    numbers.dedup();

    let mut lines = Vec::with_capacity(numbers.len());
    for n in &numbers {
        match verses.get(n) {
            Some(text) => lines.push(format!("{}. {}", n, text)),
            None => bail!("verse not found: {} {}:{}", book.title(), chapter, n),
        }
    }

    let reference = format!(
        "{} {}:{}",
        book.title(),
        chapter,
        numbers
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let mut text = format!("{}\n\n{}", reference, lines.join("\n"));
    if !attribution.is_empty() {
        text.push_str("\n\n");
        text.push_str(attribution);
    }

    Ok(Citation { reference, text })
}

/// Load `book` if needed and cite `selected` verses of `chapter`.
pub async fn cite(
    corpus: &CorpusStore,
    book: BookId,
    chapter: ChapterNumber,
    selected: &[VerseNumber],
    attribution: &str,
) -> Result<Citation> {
    if !corpus.ensure_loaded(book).await {
        return Err(NavigationError::BookUnavailable(book).into());
    }
    let verses = match corpus.get_chapter(book, chapter) {
        Some(verses) => verses,
        None => return Err(NavigationError::ChapterUnavailable { book, chapter }.into()),
    };
    format_citation(book, chapter, verses, selected, attribution)
}

/// `lectern cite`: print the citation text to stdout.
pub async fn run_cite(
    reader: &Reader,
    book: BookId,
    chapter: ChapterNumber,
    selected: &[VerseNumber],
) -> Result<()> {
    let citation = cite(
        &reader.corpus,
        book,
        chapter,
        selected,
        &reader.config.export.attribution,
    )
    .await?;
    println!("{}", citation.text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter() -> Chapter {
        let mut verses = Chapter::new();
        verses.insert(16, "For God so loved the world".to_string());
        verses.insert(17, "For God sent not his Son".to_string());
        verses.insert(2, "The same came to Jesus by night".to_string());
        verses
    }

    #[test]
    fn orders_verses_numerically() {
        let john = BookId::parse("john").unwrap();
        let citation = format_citation(john, 3, &chapter(), &[17, 2, 16, 17], "— ATTRIBUTION —")
            .unwrap();
        assert_eq!(citation.reference, "John 3:2, 16, 17");
        assert_eq!(
            citation.text,
            "John 3:2, 16, 17\n\n\
             2. The same came to Jesus by night\n\
             16. For God so loved the world\n\
             17. For God sent not his Son\n\n\
             — ATTRIBUTION —"
        );
    }

    #[test]
    fn rejects_empty_and_unknown_selections() {
        let john = BookId::parse("1john").unwrap();
        let err = format_citation(john, 3, &chapter(), &[], "").unwrap_err();
        assert!(err.to_string().contains("no verses selected"));
        let err = format_citation(john, 3, &chapter(), &[99], "").unwrap_err();
        assert!(err.to_string().contains("1 John 3:99"));
    }

    #[tokio::test]
    async fn cite_loads_the_book_on_demand() {
        use lectern_core::index::BookIndex;
        use lectern_core::source::memory::InMemorySource;

        let source = InMemorySource::new().with("john.json", r#"{"3": {"16": "For God so loved the world"}}"#);
        let corpus = CorpusStore::new(source, BookIndex::empty());
        let john = BookId::parse("john").unwrap();

        let citation = cite(&corpus, john, 3, &[16], "").await.unwrap();
        assert_eq!(citation.text, "John 3:16\n\n16. For God so loved the world");

        let err = cite(&corpus, john, 4, &[1], "").await.unwrap_err();
        assert!(err.to_string().contains("chapter not available"));
        let err = cite(&corpus, BookId::parse("jude").unwrap(), 1, &[1], "").await.unwrap_err();
        assert!(err.to_string().contains("could not load jude"));
    }
}
