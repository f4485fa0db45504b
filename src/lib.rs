//! Lese - AI Library Assistant
//!
//! A CLI library assistant over a local book catalog.
//!
//! The name "Lese" comes from the Norwegian/Scandinavian word for "read."
//!
//! # Overview
//!
//! Lese allows you to:
//! - Chat with an assistant that can search the catalog and reserve books
//! - Search the book catalog directly from the command line
//! - Sign up members and manage the catalog
//! - Decorate search results with cover art from Google Books
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `catalog` - SQLite-backed members, books, and reservations
//! - `covers` - Best-effort cover art lookup
//! - `assistant` - Tool definitions and the tool-dispatch chat session
//! - `cli` - Command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use lese::catalog::SqliteCatalog;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let catalog = SqliteCatalog::open(Path::new("library.db"))?;
//!     for book in catalog.search_books("History")? {
//!         println!("{} by {}", book.title, book.author);
//!     }
//!     Ok(())
//! }
//! ```

pub mod assistant;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod covers;
pub mod error;
pub mod openai;

pub use error::{LeseError, Result};
