//! HTTP server.
//!
//! Exposes reading, navigation, search, preferences and citations as a JSON
//! API for browser front ends. One [`Reader`] backs every request; the
//! navigator is shared behind a mutex so moves are serialized.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (version, books cached) |
//! | `GET`  | `/books` | All books with location and cache state |
//! | `GET`  | `/books/{book}/chapters` | Available chapter numbers |
//! | `GET`  | `/books/{book}/chapters/{chapter}` | Verses of one chapter |
//! | `GET`  | `/search?q=&mode=&scope=&book=&limit=` | Search cached books |
//! | `GET`  | `/position` | Current reading position |
//! | `PUT`  | `/position` | Move to `{book, chapter}` |
//! | `POST` | `/position/next` | Step forward within the book |
//! | `POST` | `/position/prev` | Step back within the book |
//! | `GET`  | `/theme` | Stored theme |
//! | `PUT`  | `/theme` | Store `{theme}` |
//! | `POST` | `/cite` | Citation for `{book, chapter, verses}` |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "john 99: chapter not available" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use lectern_core::corpus::CorpusStore;
use lectern_core::error::NavigationError;
use lectern_core::models::{BookId, ChapterNumber, NavigationPosition, VerseNumber};
use lectern_core::navigation::Navigator;
use lectern_core::preferences::{load_theme, save_theme, Theme};
use lectern_core::search::{Scope, SearchMode, SearchRequest};

use crate::books::{book_listing, BookInfo};
use crate::config::Config;
use crate::export::{cite, Citation};
use crate::progress::NoProgress;
use crate::reader::Reader;
use crate::search::{search_loaded, SearchResponse};
use crate::sqlite_kv::SqliteKv;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    corpus: Arc<CorpusStore>,
    kv: Arc<SqliteKv>,
    navigator: Arc<Mutex<Navigator>>,
}

/// Build the router over an opened [`Reader`].
pub fn router(reader: Reader) -> Router {
    let Reader {
        config,
        corpus,
        kv,
        navigator,
    } = reader;
    let state = AppState {
        config,
        corpus,
        kv,
        navigator: Arc::new(Mutex::new(navigator)),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/books", get(handle_books))
        .route("/books/{book}/chapters", get(handle_chapters))
        .route("/books/{book}/chapters/{chapter}", get(handle_chapter))
        .route("/search", get(handle_search))
        .route("/position", get(handle_get_position).put(handle_put_position))
        .route("/position/next", post(handle_next))
        .route("/position/prev", post(handle_prev))
        .route("/theme", get(handle_get_theme).put(handle_put_theme))
        .route("/cite", post(handle_cite))
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server.
///
/// Opens the reader (restoring the last position), starts the background
/// preload when `[preload].on_start` is set, then serves on `[server].bind`
/// until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let reader = Reader::open(config).await?;

    if config.preload.on_start {
        let handle = reader.spawn_preload(Box::new(NoProgress));
        tokio::spawn(async move {
            match handle.await {
                Ok(summary) => tracing::info!(
                    already_cached = summary.already_cached,
                    loaded = summary.loaded.len(),
                    failed = summary.failed.len(),
                    "background preload finished"
                ),
                Err(e) => tracing::warn!(error = %e, "background preload task failed"),
            }
        });
    }

    let bind_addr = config.server.bind.clone();
    let app = router(reader);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(bind = %bind_addr, "server listening");
    println!("Lectern server listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<NavigationError> for AppError {
    fn from(err: NavigationError) -> Self {
        not_found(err.to_string())
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

fn parse_book(name: &str) -> Result<BookId, AppError> {
    BookId::parse(name).ok_or_else(|| bad_request(format!("unknown book: {}", name)))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    books_loaded: usize,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        books_loaded: state.corpus.loaded_count(),
    })
}

// ============ GET /books ============

async fn handle_books(State(state): State<AppState>) -> Json<Vec<BookInfo>> {
    Json(book_listing(&state.corpus))
}

// ============ GET /books/{book}/chapters ============

#[derive(Serialize)]
struct ChaptersResponse {
    book: BookId,
    title: &'static str,
    chapters: Vec<ChapterNumber>,
}

async fn handle_chapters(
    State(state): State<AppState>,
    Path(book): Path<String>,
) -> Result<Json<ChaptersResponse>, AppError> {
    let book = parse_book(&book)?;
    if !state.corpus.ensure_loaded(book).await {
        return Err(NavigationError::BookUnavailable(book).into());
    }
    Ok(Json(ChaptersResponse {
        book,
        title: book.title(),
        chapters: state.corpus.chapters(book),
    }))
}

// ============ GET /books/{book}/chapters/{chapter} ============

#[derive(Serialize)]
struct VerseOut {
    verse: VerseNumber,
    text: String,
}

#[derive(Serialize)]
struct ChapterResponse {
    book: BookId,
    title: &'static str,
    chapter: ChapterNumber,
    verses: Vec<VerseOut>,
}

async fn handle_chapter(
    State(state): State<AppState>,
    Path((book, chapter)): Path<(String, ChapterNumber)>,
) -> Result<Json<ChapterResponse>, AppError> {
    let book = parse_book(&book)?;
    if !state.corpus.ensure_loaded(book).await {
        return Err(NavigationError::BookUnavailable(book).into());
    }
    let verses = state
        .corpus
        .get_chapter(book, chapter)
        .ok_or(NavigationError::ChapterUnavailable { book, chapter })?;

    Ok(Json(ChapterResponse {
        book,
        title: book.title(),
        chapter,
        verses: verses
            .iter()
            .map(|(verse, text)| VerseOut {
                verse: *verse,
                text: text.clone(),
            })
            .collect(),
    }))
}

// ============ GET /search ============

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
    mode: Option<String>,
    scope: Option<String>,
    book: Option<String>,
    limit: Option<usize>,
}

/// Searches only the books cached so far; `books_searched` tells the client
/// whether the background preload has finished for the requested scope.
async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let mode: SearchMode = match params.mode.as_deref() {
        Some(m) => m.parse::<SearchMode>().map_err(bad_request)?,
        None => SearchMode::default(),
    };
    let scope: Scope = match params.scope.as_deref() {
        Some(s) => s.parse::<Scope>().map_err(bad_request)?,
        None => Scope::default(),
    };
    let book = params.book.as_deref().map(parse_book).transpose()?;

    let req = SearchRequest::new(&params.q)
        .mode(mode)
        .scope(scope)
        .book(book)
        .limit(params.limit);
    Ok(Json(search_loaded(&state.corpus, &req)))
}

// ============ /position ============

#[derive(Deserialize)]
struct PositionBody {
    book: String,
    chapter: ChapterNumber,
}

async fn handle_get_position(State(state): State<AppState>) -> Json<NavigationPosition> {
    Json(state.navigator.lock().await.current_position())
}

async fn handle_put_position(
    State(state): State<AppState>,
    Json(body): Json<PositionBody>,
) -> Result<Json<NavigationPosition>, AppError> {
    let book = parse_book(&body.book)?;
    let position = state.navigator.lock().await.go_to(book, body.chapter).await?;
    Ok(Json(position))
}

#[derive(Serialize)]
struct StepResponse {
    /// False when already at the first or last chapter of the book.
    moved: bool,
    position: NavigationPosition,
}

async fn handle_next(State(state): State<AppState>) -> Result<Json<StepResponse>, AppError> {
    let mut navigator = state.navigator.lock().await;
    let moved = navigator.next_chapter().await?.is_some();
    Ok(Json(StepResponse {
        moved,
        position: navigator.current_position(),
    }))
}

async fn handle_prev(State(state): State<AppState>) -> Result<Json<StepResponse>, AppError> {
    let mut navigator = state.navigator.lock().await;
    let moved = navigator.prev_chapter().await?.is_some();
    Ok(Json(StepResponse {
        moved,
        position: navigator.current_position(),
    }))
}

// ============ /theme ============

#[derive(Serialize, Deserialize)]
struct ThemeBody {
    theme: String,
}

async fn handle_get_theme(State(state): State<AppState>) -> Result<Json<ThemeBody>, AppError> {
    let theme = load_theme(state.kv.as_ref())
        .await
        .map_err(|e| internal(format!("{:#}", e)))?;
    Ok(Json(ThemeBody {
        theme: theme.to_string(),
    }))
}

async fn handle_put_theme(
    State(state): State<AppState>,
    Json(body): Json<ThemeBody>,
) -> Result<Json<ThemeBody>, AppError> {
    let theme = body.theme.parse::<Theme>().map_err(bad_request)?;
    save_theme(state.kv.as_ref(), theme)
        .await
        .map_err(|e| internal(format!("{:#}", e)))?;
    Ok(Json(ThemeBody {
        theme: theme.to_string(),
    }))
}

// ============ POST /cite ============

#[derive(Deserialize)]
struct CiteBody {
    book: String,
    chapter: ChapterNumber,
    verses: Vec<VerseNumber>,
}

async fn handle_cite(
    State(state): State<AppState>,
    Json(body): Json<CiteBody>,
) -> Result<Json<Citation>, AppError> {
    let book = parse_book(&body.book)?;
    cite(
        &state.corpus,
        book,
        body.chapter,
        &body.verses,
        &state.config.export.attribution,
    )
    .await
    .map(Json)
    .map_err(|e| match e.downcast_ref::<NavigationError>() {
        Some(nav) => AppError::from(nav.clone()),
        None => bad_request(e.to_string()),
    })
}
