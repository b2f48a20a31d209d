//! # Lectern
//!
//! A scripture reader: a canonical 66-book corpus fetched lazily from a
//! directory or web server, cached once per book, searched in memory, and
//! navigated chapter by chapter with the position remembered across runs.
//!
//! The reading logic lives in the `lectern-core` crate, which has no I/O
//! of its own. This crate supplies the concrete document sources, the
//! SQLite preference store, configuration, the CLI and the HTTP server.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │   Sources    │──▶│ CorpusStore  │──▶│   Search     │
//! │  FS / HTTP   │   │ (write-once) │   │  Navigator   │
//! └──────────────┘   └──────────────┘   └──────┬───────┘
//!                                              │
//!                      ┌───────────────────────┤
//!                      ▼                       ▼
//!                 ┌──────────┐           ┌──────────┐
//!                 │   CLI    │           │   HTTP   │
//!                 │(lectern) │           │  (axum)  │
//!                 └──────────┘           └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! lectern init                        # create the state database
//! lectern read john 3                 # show a chapter and remember it
//! lectern next                        # step forward
//! lectern search "living water" --mode phrase --scope nt
//! lectern serve                       # start the HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`source_fs`] | Directory-backed document source |
//! | [`source_http`] | HTTP-backed document source |
//! | [`db`] | State database connection |
//! | [`migrate`] | State schema |
//! | [`sqlite_kv`] | Persistent key-value store |
//! | [`reader`] | Startup wiring and preload |
//! | [`progress`] | Preload progress reporting |
//! | [`books`] | Book listing |
//! | [`read`] | Chapter display and navigation commands |
//! | [`search`] | Verse search command |
//! | [`theme`] | Theme preference command |
//! | [`export`] | Verse citations |
//! | [`server`] | HTTP server |

pub mod books;
pub mod config;
pub mod db;
pub mod export;
pub mod migrate;
pub mod progress;
pub mod read;
pub mod reader;
pub mod search;
pub mod server;
pub mod source_fs;
pub mod source_http;
pub mod sqlite_kv;
pub mod theme;
