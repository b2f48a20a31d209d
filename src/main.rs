//! # Lectern CLI (`lectern`)
//!
//! The `lectern` binary reads, navigates and searches a scripture corpus,
//! and can serve the same operations over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! lectern --config ./config/lectern.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lectern init` | Create the state database |
//! | `lectern books` | List the 66 books and where each is fetched from |
//! | `lectern read [book] [chapter]` | Show a chapter (the current one by default) |
//! | `lectern goto <book> <chapter>` | Move to a chapter and show it |
//! | `lectern next` / `lectern prev` | Step one chapter within the current book |
//! | `lectern search "<query>"` | Search verses |
//! | `lectern preload` | Fetch every book into the cache |
//! | `lectern theme [light\|dark\|toggle]` | Show or change the colour theme |
//! | `lectern cite <book> <chapter> <verses>...` | Print a citation for selected verses |
//! | `lectern serve` | Start the HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! # Resume reading where you left off
//! lectern read
//!
//! # All-terms search restricted to the Old Testament
//! lectern search "shepherd lord" --mode all --scope ot
//!
//! # Citation for John 3:16-17
//! lectern cite john 3 16 17
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use lectern::progress::ProgressMode;
use lectern::read::{parse_book, Step};
use lectern::reader::Reader;
use lectern::search::SearchArgs;
use lectern::sqlite_kv::SqliteKv;
use lectern::theme::ThemeAction;
use lectern::{books, config, export, migrate, read, search, server, theme};
use lectern_core::models::{ChapterNumber, VerseNumber};
use lectern_core::search::{Scope, SearchMode};

/// Lectern: a scripture reader with lazy loading, search and navigation.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/lectern.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "lectern",
    about = "Lectern: read, navigate and search a scripture corpus",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/lectern.toml")]
    config: PathBuf,

    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the state database.
    ///
    /// Creates the SQLite file holding the reading position and preferences.
    /// Safe to run more than once.
    Init,

    /// List the books, their document locations and cache state.
    Books {
        /// Fetch every book first and report which ones are unavailable.
        #[arg(long)]
        check: bool,

        /// Progress output while checking: off, human, or json.
        #[arg(long)]
        progress: Option<ProgressMode>,
    },

    /// Show a chapter.
    ///
    /// Without arguments shows the current position. With a book only, jumps
    /// to its first chapter.
    Read {
        /// Book name, e.g. `john`, `1john`, `"Song of Solomon"`.
        book: Option<String>,
        chapter: Option<ChapterNumber>,
    },

    /// Move to a chapter and show it.
    Goto { book: String, chapter: ChapterNumber },

    /// Step to the next chapter of the current book.
    Next,

    /// Step to the previous chapter of the current book.
    Prev,

    /// Search verses.
    ///
    /// Matching is case-insensitive substring matching. Results are listed
    /// in canonical order.
    Search {
        /// Search query.
        query: String,

        /// Match mode: phrase, all, or any.
        #[arg(long, default_value = "any")]
        mode: SearchMode,

        /// Testament scope: all, ot, or nt.
        #[arg(long, default_value = "all")]
        scope: Scope,

        /// Restrict to one book.
        #[arg(long)]
        book: Option<String>,

        /// Maximum number of results.
        #[arg(long)]
        limit: Option<usize>,

        /// Print the results as JSON.
        #[arg(long)]
        json: bool,

        /// Progress output while loading books: off, human, or json.
        #[arg(long)]
        progress: Option<ProgressMode>,
    },

    /// Fetch every book into the cache.
    ///
    /// Exits non-zero if any book could not be loaded.
    Preload {
        /// Progress output: off, human, or json.
        #[arg(long)]
        progress: Option<ProgressMode>,
    },

    /// Show or change the colour theme.
    Theme {
        /// `light`, `dark`, or `toggle`. Omit to show the current theme.
        value: Option<String>,
    },

    /// Print a citation for selected verses of one chapter.
    Cite {
        book: String,
        chapter: ChapterNumber,
        #[arg(required = true)]
        verses: Vec<VerseNumber>,
    },

    /// Start the HTTP server.
    ///
    /// Binds to `[server].bind` and, when `[preload].on_start` is set,
    /// fills the corpus cache in the background.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("State database initialized successfully.");
        }
        Commands::Theme { value } => {
            let action = ThemeAction::parse(value.as_deref())?;
            let kv = SqliteKv::open(&cfg).await?;
            theme::run_theme(&kv, action).await?;
            kv.close().await;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        command => {
            let mut reader = Reader::open(&cfg).await?;
            match command {
                Commands::Books { check, progress } => {
                    books::run_books(&reader, check, progress_or_default(progress)).await?;
                }
                Commands::Read { book, chapter } => {
                    read::run_read(&mut reader, book.as_deref(), chapter).await?;
                }
                Commands::Goto { book, chapter } => {
                    read::run_read(&mut reader, Some(&book), Some(chapter)).await?;
                }
                Commands::Next => read::run_step(&mut reader, Step::Next).await?,
                Commands::Prev => read::run_step(&mut reader, Step::Prev).await?,
                Commands::Search {
                    query,
                    mode,
                    scope,
                    book,
                    limit,
                    json,
                    progress,
                } => {
                    let book = book.as_deref().map(parse_book).transpose()?;
                    let args = SearchArgs {
                        query: &query,
                        mode,
                        scope,
                        book,
                        limit,
                        json,
                    };
                    search::run_search(&reader, args, progress_or_default(progress)).await?;
                }
                Commands::Preload { progress } => {
                    let summary = reader.preload(progress_or_default(progress).reporter().as_ref()).await;
                    println!(
                        "Preload complete: {} already cached, {} loaded, {} failed.",
                        summary.already_cached,
                        summary.loaded.len(),
                        summary.failed.len()
                    );
                    for (book, error) in &summary.failed {
                        eprintln!("  {}: {}", book, error);
                    }
                    if !summary.failed.is_empty() {
                        std::process::exit(1);
                    }
                }
                Commands::Cite {
                    book,
                    chapter,
                    verses,
                } => {
                    export::run_cite(&reader, parse_book(&book)?, chapter, &verses).await?;
                }
                Commands::Init | Commands::Theme { .. } | Commands::Serve => {
                    unreachable!("handled before opening the reader")
                }
            }
            reader.kv.close().await;
        }
    }

    Ok(())
}

fn progress_or_default(mode: Option<ProgressMode>) -> ProgressMode {
    mode.unwrap_or_else(ProgressMode::default_for_tty)
}
