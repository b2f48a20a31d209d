//! # Lectern Core
//!
//! Shared, WASM-safe logic for Lectern: book models, the book index,
//! the document source abstraction, the write-once corpus cache, the
//! linear search algorithm, and navigation state.
//!
//! This crate contains no filesystem, network, or database I/O. Those
//! live behind the [`source::DocumentSource`] and [`kv::KeyValueStore`]
//! traits and are implemented by the application crate. Only tokio's
//! `sync` primitives are used, which compile for `wasm32-unknown-unknown`.

pub mod corpus;
pub mod error;
pub mod index;
pub mod kv;
pub mod models;
pub mod navigation;
pub mod preferences;
pub mod search;
pub mod source;
