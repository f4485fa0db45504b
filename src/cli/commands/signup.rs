//! Signup command - register a new library member.

use crate::catalog::SqliteCatalog;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::LeseError;

/// Run the signup command.
pub fn run_signup(name: &str, email: &str, settings: Settings) -> anyhow::Result<()> {
    let catalog = SqliteCatalog::open(&settings.sqlite_path())?;

    match catalog.create_member(name, email) {
        Ok(id) => {
            Output::success(&format!(
                "You are now a member. Your new Member ID is {}. Please use it to log in.",
                id
            ));
            Output::info(&format!("Try: lese chat --member-id {} --name '{}'", id, name));
        }
        Err(e @ (LeseError::DuplicateEmail(_) | LeseError::InvalidInput(_))) => {
            Output::error(&format!("{}", e));
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
