//! Linear keyword and phrase search over the cached corpus.
//!
//! The search algorithm reads the [`CorpusStore`] and nothing else. Books
//! that are not cached contribute no matches, so full recall requires a
//! completed preload.
//!
//! # Algorithm
//!
//! 1. Trim and lowercase the query. An empty query yields
//!    [`SearchOutcome::EmptyQuery`].
//! 2. Tokenize: phrase mode keeps the whole query as one token, the term
//!    modes split it on whitespace.
//! 3. Walk cached books in canonical order, chapters and verses ascending,
//!    skipping books excluded by the scope or book filter.
//! 4. Lowercase each verse and test for substring containment.
//! 5. Emit matches in walk order. There is no ranking.
//!
//! Matching is plain substring matching: `"love"` matches `"beloved"`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::corpus::CorpusStore;
use crate::models::{BookId, SearchResult, Testament};

/// How query tokens must appear in a verse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// The whole query as one contiguous substring.
    Phrase,
    /// Every whitespace-separated term must appear.
    #[serde(alias = "allterms")]
    All,
    /// At least one term must appear.
    #[default]
    #[serde(alias = "anyterm")]
    Any,
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "phrase" => Ok(SearchMode::Phrase),
            "all" | "allterms" => Ok(SearchMode::All),
            "any" | "anyterm" => Ok(SearchMode::Any),
            other => Err(format!(
                "unknown search mode: {}. Use phrase, all, or any.",
                other
            )),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SearchMode::Phrase => "phrase",
            SearchMode::All => "all",
            SearchMode::Any => "any",
        })
    }
}

/// Which part of the canon to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    All,
    #[serde(alias = "ot")]
    Old,
    #[serde(alias = "nt")]
    New,
}

impl Scope {
    pub fn admits(self, book: BookId) -> bool {
        match self {
            Scope::All => true,
            Scope::Old => book.testament() == Testament::Old,
            Scope::New => book.testament() == Testament::New,
        }
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Scope::All),
            "ot" | "old" => Ok(Scope::Old),
            "nt" | "new" => Ok(Scope::New),
            other => Err(format!("unknown scope: {}. Use all, ot, or nt.", other)),
        }
    }
}

/// Bundles all inputs for a single search invocation.
#[derive(Debug, Clone)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub mode: SearchMode,
    pub scope: Scope,
    /// Restrict to exactly one book (applied in addition to `scope`).
    pub book: Option<BookId>,
    /// Stop after this many matches.
    pub limit: Option<usize>,
}

impl<'a> SearchRequest<'a> {
    /// A request over the whole corpus with default mode.
    pub fn new(query: &'a str) -> Self {
        Self {
            query,
            mode: SearchMode::default(),
            scope: Scope::default(),
            book: None,
            limit: None,
        }
    }

    pub fn mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn book(mut self, book: Option<BookId>) -> Self {
        self.book = book;
        self
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// True when the query has no searchable text; [`search`] answers
    /// [`SearchOutcome::EmptyQuery`] without looking at the corpus.
    pub fn is_blank(&self) -> bool {
        self.query.trim().is_empty()
    }
}

/// Outcome of a search.
///
/// `EmptyQuery` tells the caller to prompt for input; it is distinct from
/// `Matches` with an empty list, which means nothing matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "results", rename_all = "snake_case")]
pub enum SearchOutcome {
    EmptyQuery,
    Matches(Vec<SearchResult>),
}

impl SearchOutcome {
    /// The matches, or an empty slice for an empty query.
    pub fn results(&self) -> &[SearchResult] {
        match self {
            SearchOutcome::EmptyQuery => &[],
            SearchOutcome::Matches(results) => results,
        }
    }

    pub fn is_empty_query(&self) -> bool {
        matches!(self, SearchOutcome::EmptyQuery)
    }
}

/// Split a normalized query into the tokens tested against each verse.
pub fn tokenize(normalized: &str, mode: SearchMode) -> Vec<&str> {
    match mode {
        SearchMode::Phrase => vec![normalized],
        SearchMode::All | SearchMode::Any => normalized.split_whitespace().collect(),
    }
}

fn matches(text: &str, tokens: &[&str], mode: SearchMode) -> bool {
    match mode {
        SearchMode::Phrase | SearchMode::All => tokens.iter().all(|t| text.contains(t)),
        SearchMode::Any => tokens.iter().any(|t| text.contains(t)),
    }
}

/// Run a search against the cached corpus.
///
/// This is the core search function that all frontends (CLI, HTTP)
/// delegate to.
pub fn search(corpus: &CorpusStore, req: &SearchRequest<'_>) -> SearchOutcome {
    let normalized = req.query.trim().to_lowercase();
    if normalized.is_empty() {
        return SearchOutcome::EmptyQuery;
    }
    let tokens = tokenize(&normalized, req.mode);
    let limit = req.limit.unwrap_or(usize::MAX);

    let mut results = Vec::new();
    let books = corpus
        .loaded_books()
        .filter(|(book, _)| req.scope.admits(*book))
        .filter(|(book, _)| req.book.map_or(true, |only| only == *book));

    'books: for (book, doc) in books {
        for (chapter, verses) in doc.chapters() {
            for (verse, text) in verses {
                if results.len() >= limit {
                    break 'books;
                }
                if matches(&text.to_lowercase(), &tokens, req.mode) {
                    results.push(SearchResult {
                        book,
                        chapter,
                        verse: *verse,
                        text: text.clone(),
                    });
                }
            }
        }
    }

    tracing::debug!(
        query = %normalized,
        mode = %req.mode,
        matches = results.len(),
        searched_books = corpus.loaded_count(),
        "search complete"
    );
    SearchOutcome::Matches(results)
}
