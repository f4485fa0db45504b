//! Search command implementation.

use crate::catalog::SqliteCatalog;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::covers::CoverClient;

/// Run the search command.
pub async fn run_search(query: &str, no_covers: bool, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Search, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let catalog = SqliteCatalog::open(&settings.sqlite_path())?;
    let covers = if no_covers {
        CoverClient::disabled()
    } else {
        CoverClient::new(&settings.covers)
    };

    let spinner = Output::spinner("Searching...");
    let books = catalog.search_books(query);
    spinner.finish_and_clear();

    match books {
        Ok(books) => {
            if books.is_empty() {
                Output::warning("No books found matching your query.");
            } else {
                Output::success(&format!("Found {} books", books.len()));

                for book in &books {
                    let cover = covers.fetch_cover_url(&book.title, &book.author).await;
                    Output::book_result(book, cover.as_deref());
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(anyhow::anyhow!("{}", e));
        }
    }

    Ok(())
}
