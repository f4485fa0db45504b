//! Add-book command - admin path for extending the catalog.

use crate::catalog::SqliteCatalog;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::LeseError;

/// Run the add-book command.
pub fn run_add_book(
    title: &str,
    author: &str,
    genre: Option<&str>,
    copies: i64,
    settings: Settings,
) -> anyhow::Result<()> {
    let catalog = SqliteCatalog::open(&settings.sqlite_path())?;

    match catalog.create_book(title, author, genre, copies) {
        Ok(_) => {
            Output::success(&format!("Successfully added '{}' to the catalog.", title));
        }
        Err(e @ (LeseError::DuplicateTitle(_) | LeseError::InvalidInput(_))) => {
            Output::error(&format!("{}", e));
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
