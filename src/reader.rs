//! Application wiring: one [`Reader`] per process.
//!
//! Startup order matters for first-paint latency:
//!
//! 1. Build the document source and load the book index (degrading to the
//!    fallback naming rule if the index is missing).
//! 2. Open the state database and restore the last position, loading only
//!    the starting book.
//! 3. Only then start filling the rest of the corpus, either in the
//!    background ([`Reader::spawn_preload`]) or inline ([`Reader::preload`]).

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use lectern_core::corpus::{CorpusStore, PreloadSummary};
use lectern_core::kv::KeyValueStore;
use lectern_core::models::BookId;
use lectern_core::navigation::Navigator;
use lectern_core::source::DocumentSource;

use crate::config::Config;
use crate::progress::PreloadReporter;
use crate::source_fs::FsSource;
use crate::source_http::HttpSource;
use crate::sqlite_kv::SqliteKv;

/// Build the document source described by `[corpus]`.
pub fn build_source(config: &Config) -> Result<Box<dyn DocumentSource>> {
    if config.corpus.is_remote() {
        let timeout = Duration::from_secs(config.corpus.timeout_secs);
        Ok(Box::new(HttpSource::new(&config.corpus.root, timeout)?))
    } else {
        Ok(Box::new(FsSource::new(&config.corpus.root)))
    }
}

pub struct Reader {
    pub config: Arc<Config>,
    pub corpus: Arc<CorpusStore>,
    pub kv: Arc<SqliteKv>,
    pub navigator: Navigator,
}

impl Reader {
    /// Open the corpus and state database and restore the reading position.
    pub async fn open(config: &Config) -> Result<Self> {
        let source = build_source(config)?;
        tracing::debug!(source = %source.describe(), "opening corpus");
        let corpus = Arc::new(CorpusStore::open(source, &config.corpus.index).await);

        let kv = Arc::new(SqliteKv::open(config).await?);
        let default = config
            .navigation
            .default_position()
            .context("Invalid [navigation] defaults")?;
        let navigator = Navigator::restore(
            corpus.clone(),
            kv.clone() as Arc<dyn KeyValueStore>,
            default,
        )
        .await;

        Ok(Self {
            config: Arc::new(config.clone()),
            corpus,
            kv,
            navigator,
        })
    }

    /// Load every book not cached yet and wait for completion.
    pub async fn preload(&self, reporter: &dyn PreloadReporter) -> PreloadSummary {
        let books: Vec<BookId> = BookId::all().collect();
        self.preload_books(&books, reporter).await
    }

    /// Load the listed books that are not cached yet and wait for completion.
    pub async fn preload_books(
        &self,
        books: &[BookId],
        reporter: &dyn PreloadReporter,
    ) -> PreloadSummary {
        preload_corpus(&self.corpus, books, self.config.preload.concurrency, reporter).await
    }

    /// Start loading every book not cached yet in the background.
    pub fn spawn_preload(&self, reporter: Box<dyn PreloadReporter>) -> JoinHandle<PreloadSummary> {
        let corpus = self.corpus.clone();
        let concurrency = self.config.preload.concurrency;
        tokio::spawn(async move {
            let books: Vec<BookId> = BookId::all().collect();
            preload_corpus(&corpus, &books, concurrency, reporter.as_ref()).await
        })
    }
}

async fn preload_corpus(
    corpus: &CorpusStore,
    books: &[BookId],
    concurrency: usize,
    reporter: &dyn PreloadReporter,
) -> PreloadSummary {
    corpus
        .preload_with_progress(books, concurrency, |event| reporter.report(event))
        .await
}
