//! SQLite-backed catalog store.
//!
//! Every operation is a single synchronous round-trip; reservations are the
//! only multi-statement path and run inside one transaction.

use super::{Book, Member, Reservation};
use crate::error::{LeseError, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS members (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    join_date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL UNIQUE,
    author TEXT NOT NULL,
    genre TEXT,
    copies INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS reservations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    member_id INTEGER NOT NULL REFERENCES members(id),
    book_id INTEGER NOT NULL REFERENCES books(id),
    reserved_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reservations_member_id ON reservations(member_id);
"#;

/// SQLite-backed catalog of members, books, and reservations.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Open (or create) a catalog database at the given path.
    #[instrument(skip_all)]
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL keeps concurrent readers happy with the single-writer model
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Opened catalog database at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory catalog (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| LeseError::Config(format!("Failed to acquire catalog lock: {}", e)))
    }

    /// Wipe all tables and insert the deterministic demo data set:
    /// the admin (ID 0), one sample member "Taha" (ID 1), and six books.
    pub fn seed_demo_data(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            r#"
            DELETE FROM reservations;
            DELETE FROM books;
            DELETE FROM members;
            DELETE FROM sqlite_sequence WHERE name IN ('members', 'books', 'reservations');
            "#,
        )?;

        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO members (id, name, email, join_date) VALUES (0, 'Admin', 'admin@library.com', ?1)",
            params![now],
        )?;
        conn.execute(
            "INSERT INTO members (id, name, email, join_date) VALUES (1, 'Taha', 'taha@example.com', ?1)",
            params![now],
        )?;

        let books = [
            ("The Three-Body Problem", "Cixin Liu", "Science Fiction", 5),
            ("Astrophysics for People in a Hurry", "Neil deGrasse Tyson", "Physics", 3),
            ("Sapiens: A Brief History of Humankind", "Yuval Noah Harari", "History", 4),
            ("Project Hail Mary", "Andy Weir", "Science Fiction", 6),
            ("A Brief History of Time", "Stephen Hawking", "Physics", 2),
            ("The God Equation", "Michio Kaku", "Physics", 3),
        ];

        let mut stmt = conn
            .prepare("INSERT INTO books (title, author, genre, copies) VALUES (?1, ?2, ?3, ?4)")?;
        for (title, author, genre, copies) in books {
            stmt.execute(params![title, author, genre, copies])?;
        }

        info!("Seeded catalog with demo members and books");
        Ok(())
    }

    /// Look up a member by ID and name.
    ///
    /// The name match is case-insensitive and whitespace-trimmed; the ID
    /// match is exact.
    pub fn find_member_by_credentials(&self, id: i64, name: &str) -> Result<Option<Member>> {
        let conn = self.lock()?;
        let member = conn
            .query_row(
                "SELECT id, name, email, join_date FROM members WHERE id = ?1 AND lower(name) = ?2",
                params![id, name.trim().to_lowercase()],
                row_to_member,
            )
            .optional()?;
        Ok(member)
    }

    /// Look up a member by ID.
    pub fn find_member_by_id(&self, id: i64) -> Result<Option<Member>> {
        let conn = self.lock()?;
        let member = conn
            .query_row(
                "SELECT id, name, email, join_date FROM members WHERE id = ?1",
                params![id],
                row_to_member,
            )
            .optional()?;
        Ok(member)
    }

    /// Create a new member and return their ID.
    ///
    /// Fails with [`LeseError::DuplicateEmail`] if the email is taken.
    pub fn create_member(&self, name: &str, email: &str) -> Result<i64> {
        if name.trim().is_empty() || email.trim().is_empty() {
            return Err(LeseError::InvalidInput(
                "Member name and email must not be empty".to_string(),
            ));
        }

        let conn = self.lock()?;
        let result = conn.execute(
            "INSERT INTO members (name, email, join_date) VALUES (?1, ?2, ?3)",
            params![name.trim(), email.trim(), Utc::now().to_rfc3339()],
        );

        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(e) if is_unique_violation(&e) => Err(LeseError::DuplicateEmail(email.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Search books whose title or author contains `query` as a
    /// case-sensitive substring. An empty result is a normal outcome.
    pub fn search_books(&self, query: &str) -> Result<Vec<Book>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, author, genre, copies FROM books
             WHERE instr(title, ?1) > 0 OR instr(author, ?1) > 0
             ORDER BY title",
        )?;

        let books = stmt
            .query_map(params![query], row_to_book)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!("Search '{}' matched {} books", query, books.len());
        Ok(books)
    }

    /// Look up a book by exact title.
    pub fn find_book_by_title(&self, title: &str) -> Result<Option<Book>> {
        let conn = self.lock()?;
        let book = conn
            .query_row(
                "SELECT id, title, author, genre, copies FROM books WHERE title = ?1",
                params![title],
                row_to_book,
            )
            .optional()?;
        Ok(book)
    }

    /// Add a book to the catalog and return its ID.
    ///
    /// Fails with [`LeseError::DuplicateTitle`] if the title exists already.
    pub fn create_book(
        &self,
        title: &str,
        author: &str,
        genre: Option<&str>,
        copies: i64,
    ) -> Result<i64> {
        if copies < 1 {
            return Err(LeseError::InvalidInput(
                "A new book needs at least one copy".to_string(),
            ));
        }

        let conn = self.lock()?;
        let result = conn.execute(
            "INSERT INTO books (title, author, genre, copies) VALUES (?1, ?2, ?3, ?4)",
            params![title, author, genre, copies],
        );

        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(e) if is_unique_violation(&e) => Err(LeseError::DuplicateTitle(title.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Reserve a book for a member: records a reservation and decrements the
    /// book's copy count, atomically.
    pub fn reserve_book(&self, member_id: i64, title: &str) -> Result<Reservation> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let book = tx
            .query_row(
                "SELECT id, title, author, genre, copies FROM books WHERE title = ?1",
                params![title],
                row_to_book,
            )
            .optional()?
            .ok_or_else(|| LeseError::BookNotFound(title.to_string()))?;

        if book.copies < 1 {
            return Err(LeseError::NoCopiesAvailable(title.to_string()));
        }

        let reserved_at = Utc::now();
        tx.execute(
            "UPDATE books SET copies = copies - 1 WHERE id = ?1",
            params![book.id],
        )?;
        tx.execute(
            "INSERT INTO reservations (member_id, book_id, reserved_at) VALUES (?1, ?2, ?3)",
            params![member_id, book.id, reserved_at.to_rfc3339()],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        info!("Member {} reserved '{}'", member_id, title);

        Ok(Reservation {
            id,
            member_id,
            book_id: book.id,
            title: book.title,
            reserved_at,
        })
    }

    /// List a member's reservations, newest first.
    pub fn reservations_for_member(&self, member_id: i64) -> Result<Vec<Reservation>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT r.id, r.member_id, r.book_id, b.title, r.reserved_at
             FROM reservations r JOIN books b ON b.id = r.book_id
             WHERE r.member_id = ?1
             ORDER BY r.reserved_at DESC",
        )?;

        let reservations = stmt
            .query_map(params![member_id], |row| {
                Ok(Reservation {
                    id: row.get(0)?,
                    member_id: row.get(1)?,
                    book_id: row.get(2)?,
                    title: row.get(3)?,
                    reserved_at: parse_datetime(row.get::<_, String>(4)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(reservations)
    }

    /// Number of books in the catalog.
    pub fn book_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn row_to_member(row: &Row<'_>) -> rusqlite::Result<Member> {
    Ok(Member {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        join_date: parse_datetime(row.get::<_, String>(3)?),
    })
}

fn row_to_book(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        genre: row.get(3)?,
        copies: row.get(4)?,
    })
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_catalog() -> SqliteCatalog {
        let catalog = SqliteCatalog::in_memory().unwrap();
        catalog.seed_demo_data().unwrap();
        catalog
    }

    #[test]
    fn test_login_matches_case_insensitively() {
        let catalog = seeded_catalog();

        let member = catalog.find_member_by_credentials(1, "Taha").unwrap();
        assert_eq!(member.unwrap().email, "taha@example.com");

        let member = catalog.find_member_by_credentials(1, "  taha  ").unwrap();
        assert!(member.is_some());

        let member = catalog.find_member_by_credentials(1, "Wrong").unwrap();
        assert!(member.is_none());

        let member = catalog.find_member_by_credentials(99, "Taha").unwrap();
        assert!(member.is_none());
    }

    #[test]
    fn test_admin_convention() {
        let catalog = seeded_catalog();
        let admin = catalog.find_member_by_id(0).unwrap().unwrap();
        assert!(admin.is_admin());
        let member = catalog.find_member_by_id(1).unwrap().unwrap();
        assert!(!member.is_admin());
    }

    #[test]
    fn test_search_is_case_sensitive_substring() {
        let catalog = seeded_catalog();

        let results = catalog.search_books("physics").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Astrophysics for People in a Hurry");

        // Capitalized needle must not match the lowercase substring
        let results = catalog.search_books("Physics").unwrap();
        assert!(results.is_empty());

        // Author substring matches too
        let results = catalog.search_books("Hawking").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "A Brief History of Time");

        // Empty result set is a normal outcome
        let results = catalog.search_books("Nonexistent").unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_search_matches_title_or_author() {
        let catalog = seeded_catalog();
        let results = catalog.search_books("History").unwrap();
        let titles: Vec<_> = results.iter().map(|b| b.title.as_str()).collect();
        assert!(titles.contains(&"Sapiens: A Brief History of Humankind"));
        assert!(titles.contains(&"A Brief History of Time"));
    }

    #[test]
    fn test_signup_ids_increase_and_duplicates_fail() {
        let catalog = seeded_catalog();

        let first = catalog.create_member("Ada", "ada@example.com").unwrap();
        let second = catalog.create_member("Grace", "grace@example.com").unwrap();
        assert!(second > first);

        let err = catalog.create_member("Ada Again", "ada@example.com");
        assert!(matches!(err, Err(LeseError::DuplicateEmail(_))));
    }

    #[test]
    fn test_duplicate_title_leaves_copies_untouched() {
        let catalog = seeded_catalog();

        let before = catalog
            .find_book_by_title("Project Hail Mary")
            .unwrap()
            .unwrap();

        let err = catalog.create_book("Project Hail Mary", "Someone Else", None, 9);
        assert!(matches!(err, Err(LeseError::DuplicateTitle(_))));

        let after = catalog
            .find_book_by_title("Project Hail Mary")
            .unwrap()
            .unwrap();
        assert_eq!(before.copies, after.copies);
    }

    #[test]
    fn test_create_book_requires_a_copy() {
        let catalog = seeded_catalog();
        let err = catalog.create_book("Empty Shelf", "Nobody", None, 0);
        assert!(matches!(err, Err(LeseError::InvalidInput(_))));
    }

    #[test]
    fn test_reserve_decrements_and_persists() {
        let catalog = seeded_catalog();

        let before = catalog
            .find_book_by_title("The God Equation")
            .unwrap()
            .unwrap();

        let reservation = catalog.reserve_book(1, "The God Equation").unwrap();
        assert_eq!(reservation.member_id, 1);
        assert_eq!(reservation.title, "The God Equation");

        let after = catalog
            .find_book_by_title("The God Equation")
            .unwrap()
            .unwrap();
        assert_eq!(after.copies, before.copies - 1);

        let reservations = catalog.reservations_for_member(1).unwrap();
        assert_eq!(reservations.len(), 1);
        assert_eq!(reservations[0].book_id, before.id);
    }

    #[test]
    fn test_reserve_unknown_title_fails() {
        let catalog = seeded_catalog();
        let err = catalog.reserve_book(1, "No Such Book");
        assert!(matches!(err, Err(LeseError::BookNotFound(_))));
    }

    #[test]
    fn test_reserve_fails_when_out_of_copies() {
        let catalog = seeded_catalog();
        catalog.create_book("Rare Volume", "One Copy", None, 1).unwrap();

        catalog.reserve_book(1, "Rare Volume").unwrap();
        let err = catalog.reserve_book(1, "Rare Volume");
        assert!(matches!(err, Err(LeseError::NoCopiesAvailable(_))));

        // Copy count never goes negative
        let book = catalog.find_book_by_title("Rare Volume").unwrap().unwrap();
        assert_eq!(book.copies, 0);
    }

    #[test]
    fn test_seed_is_deterministic() {
        let catalog = seeded_catalog();
        assert_eq!(catalog.book_count().unwrap(), 6);

        // Reseeding wipes and restores the same state
        catalog.create_book("Extra", "Someone", None, 1).unwrap();
        catalog.seed_demo_data().unwrap();
        assert_eq!(catalog.book_count().unwrap(), 6);
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.db");

        let catalog = SqliteCatalog::open(&path).unwrap();
        catalog.seed_demo_data().unwrap();
        drop(catalog);

        let reopened = SqliteCatalog::open(&path).unwrap();
        assert_eq!(reopened.book_count().unwrap(), 6);
    }
}
