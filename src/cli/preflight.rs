//! Pre-flight checks before operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{LeseError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Chat requires an API key and the catalog database.
    Chat,
    /// Search requires the catalog database.
    Search,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Chat => {
            check_api_key()?;
            check_database(settings)?;
        }
        Operation::Search => {
            check_database(settings)?;
        }
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(LeseError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(LeseError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check if the catalog database has been initialized.
fn check_database(settings: &Settings) -> Result<()> {
    let path = settings.sqlite_path();
    if path.exists() {
        Ok(())
    } else {
        Err(LeseError::Config(format!(
            "Catalog database not found at {}. Run 'lese init' first.",
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_database_is_reported() {
        let mut settings = Settings::default();
        settings.catalog.sqlite_path = "/nonexistent/lese/library.db".to_string();

        let err = check(Operation::Search, &settings);
        assert!(matches!(err, Err(LeseError::Config(_))));
    }
}
