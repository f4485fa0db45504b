//! Catalog persistence for Lese.
//!
//! Members, books, and reservations backed by SQLite.

mod sqlite;

pub use sqlite::SqliteCatalog;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A library member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Unique member ID. ID 0 is the administrator by convention.
    pub id: i64,
    /// Member name.
    pub name: String,
    /// Member email (unique).
    pub email: String,
    /// When the member joined.
    pub join_date: DateTime<Utc>,
}

impl Member {
    /// Whether this member is the administrator (ID 0 by convention).
    pub fn is_admin(&self) -> bool {
        self.id == 0
    }
}

/// A book in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    /// Unique book ID.
    pub id: i64,
    /// Book title (unique).
    pub title: String,
    /// Author name.
    pub author: String,
    /// Genre, if known.
    pub genre: Option<String>,
    /// Number of copies currently available.
    pub copies: i64,
}

/// A reservation placed by a member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique reservation ID.
    pub id: i64,
    /// The reserving member.
    pub member_id: i64,
    /// The reserved book.
    pub book_id: i64,
    /// Title of the reserved book.
    pub title: String,
    /// When the reservation was placed.
    pub reserved_at: DateTime<Utc>,
}
