//! Verse search over the loaded corpus.
//!
//! The CLI loads every book the request can match before searching, so a
//! one-shot `lectern search` always covers the whole scope. The HTTP server
//! searches whatever is cached at request time and reports how many books
//! that was.

use anyhow::Result;
use serde::Serialize;

use lectern_core::corpus::CorpusStore;
use lectern_core::models::{BookId, SearchResult};
use lectern_core::search::{search, Scope, SearchMode, SearchOutcome, SearchRequest};

use crate::progress::ProgressMode;
use crate::reader::Reader;

/// Books a search with this scope and book filter can return results from.
pub fn books_for(scope: Scope, book: Option<BookId>) -> Vec<BookId> {
    BookId::all()
        .filter(|b| scope.admits(*b))
        .filter(|b| book.map_or(true, |wanted| wanted == *b))
        .collect()
}

/// Search response shape shared by the CLI `--json` output and `GET /search`.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// `"empty_query"` or `"ok"`.
    pub status: &'static str,
    pub results: Vec<SearchResult>,
    /// Books in scope that were loaded when the search ran.
    pub books_searched: usize,
    /// Books in scope.
    pub books_in_scope: usize,
}

/// Run a search against whatever is cached and describe how much was covered.
pub fn search_loaded(corpus: &CorpusStore, req: &SearchRequest<'_>) -> SearchResponse {
    let in_scope = books_for(req.scope, req.book);
    let searched = in_scope.iter().filter(|b| corpus.is_loaded(**b)).count();
    let (status, results) = match search(corpus, req) {
        SearchOutcome::EmptyQuery => ("empty_query", Vec::new()),
        SearchOutcome::Matches(results) => ("ok", results),
    };
    SearchResponse {
        status,
        results,
        books_searched: searched,
        books_in_scope: in_scope.len(),
    }
}

pub struct SearchArgs<'a> {
    pub query: &'a str,
    pub mode: SearchMode,
    pub scope: Scope,
    pub book: Option<BookId>,
    pub limit: Option<usize>,
    pub json: bool,
}

/// `lectern search`: load the books in scope, search, and print matches.
pub async fn run_search(reader: &Reader, args: SearchArgs<'_>, progress: ProgressMode) -> Result<()> {
    let req = SearchRequest::new(args.query)
        .mode(args.mode)
        .scope(args.scope)
        .book(args.book)
        .limit(args.limit);

    if !req.is_blank() {
        let books = books_for(args.scope, args.book);
        let summary = reader.preload_books(&books, progress.reporter().as_ref()).await;
        if !summary.failed.is_empty() {
            eprintln!(
                "warning: {} book(s) unavailable; results may be incomplete",
                summary.failed.len()
            );
        }
    }

    let response = search_loaded(&reader.corpus, &req);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if response.status == "empty_query" {
        println!("Please enter search terms.");
        return Ok(());
    }
    if response.results.is_empty() {
        println!("No verses found.");
        return Ok(());
    }

    for result in &response.results {
        println!(
            "{} {}:{}  {}",
            result.book.title(),
            result.chapter,
            result.verse,
            result.text
        );
    }
    println!();
    println!(
        "{} verse(s) found in {} book(s) searched.",
        response.results.len(),
        response.books_searched
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_core::index::BookIndex;
    use lectern_core::source::memory::InMemorySource;

    #[test]
    fn books_for_applies_scope_and_book_filter() {
        assert_eq!(books_for(Scope::All, None).len(), 66);
        assert_eq!(books_for(Scope::Old, None).len(), 39);
        assert_eq!(books_for(Scope::New, None).len(), 27);

        let john = BookId::parse("john").unwrap();
        assert_eq!(books_for(Scope::New, Some(john)), vec![john]);
        assert!(books_for(Scope::Old, Some(john)).is_empty());
    }

    #[tokio::test]
    async fn search_loaded_reports_coverage() {
        let source = InMemorySource::new().with(
            "john.json",
            r#"{"3": {"16": "For God so loved the world"}}"#,
        );
        let corpus = CorpusStore::new(source, BookIndex::empty());
        assert!(corpus.ensure_loaded(BookId::parse("john").unwrap()).await);

        let response = search_loaded(&corpus, &SearchRequest::new("loved").scope(Scope::New));
        assert_eq!(response.status, "ok");
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.books_searched, 1);
        assert_eq!(response.books_in_scope, 27);

        let response = search_loaded(&corpus, &SearchRequest::new("   "));
        assert_eq!(response.status, "empty_query");
        assert!(response.results.is_empty());
    }
}
